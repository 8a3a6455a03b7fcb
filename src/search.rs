use crate::contact::Contact;

/// Normalize a string for case-insensitive matching.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

/// Case-insensitive substring match against name or email.
pub fn matches(query: &str, contact: &Contact) -> bool {
    let needle = normalize(query);
    normalize(&contact.name).contains(&needle) || normalize(&contact.email).contains(&needle)
}

/// Stable filter of `source` by `query`. An empty query keeps every entry.
pub fn filter<'a, I>(query: &str, source: I) -> Vec<Contact>
where
    I: IntoIterator<Item = &'a Contact>,
{
    source
        .into_iter()
        .filter(|contact| matches(query, contact))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Catalog;

    fn ids(contacts: &[Contact]) -> Vec<u64> {
        contacts.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_matches_name_or_email() {
        let contact = Contact::new(1, "Ravi Kumar", "ravi@example.com", "");
        assert!(matches("kum", &contact));
        assert!(matches("RAVI@", &contact));
        assert!(matches("Example.COM", &contact));
        assert!(!matches("sanjay", &contact));
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        let catalog = Catalog::builtin();
        assert_eq!(ids(&filter("", catalog.contacts())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_preserves_source_order() {
        let catalog = Catalog::builtin();
        // "a" appears in every name; order must follow the catalog
        assert_eq!(ids(&filter("a", catalog.contacts())), vec![1, 2, 3, 4]);
        assert_eq!(ids(&filter("ra", catalog.contacts())), vec![2, 4]);
    }

    #[test]
    fn test_filter_matches_email_only() {
        let catalog = Catalog::builtin();
        // "bhaskar" is only in the email of "Bharkar Rai"
        assert_eq!(ids(&filter("bhaskar", catalog.contacts())), vec![4]);
    }

    #[test]
    fn test_unmatched_query_is_empty() {
        let catalog = Catalog::builtin();
        assert!(filter("zzz", catalog.contacts()).is_empty());
    }

    #[test]
    fn test_query_is_not_trimmed() {
        let catalog = Catalog::builtin();
        // Every builtin name has a space, no email does
        assert_eq!(filter(" ", catalog.contacts()).len(), 4);
        assert!(filter("ravi ", catalog.contacts()).len() == 1);
    }

    #[test]
    fn test_filter_agrees_with_predicate() {
        let catalog = Catalog::builtin();
        for query in ["", "a", "AY", "example", "kumar", "@", "xyz", "i r"] {
            let result = filter(query, catalog.contacts());
            let expected: Vec<u64> = catalog
                .contacts()
                .iter()
                .filter(|c| {
                    c.name.to_lowercase().contains(&query.to_lowercase())
                        || c.email.to_lowercase().contains(&query.to_lowercase())
                })
                .map(|c| c.id)
                .collect();
            assert_eq!(ids(&result), expected, "query {:?}", query);
        }
    }
}
