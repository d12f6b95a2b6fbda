use registry::TREE_SEPARATOR;

/// Placeholder replaced by the (flattened) identifier in an address
/// expression.
pub const ID_TOKEN: &str = "${id}";

/// Qualifies bare registry identifiers into the remote addressing scheme.
///
/// Pure function of configuration: an identifier expression per entity kind
/// plus the remote domain. Registry tree separators are flattened to
/// underscores because remote addresses cannot contain colons.
#[derive(Debug, Clone)]
pub struct AddressFormatter {
    group_expression: String,
    subject_expression: String,
    domain: String
}

impl AddressFormatter {
    pub fn new(
        group_expression: impl Into<String>,
        subject_expression: impl Into<String>,
        domain: impl Into<String>
    ) -> Self {
        Self {
            group_expression: group_expression.into(),
            subject_expression: subject_expression.into(),
            domain: domain.into()
        }
    }

    pub fn qualify_group_address(&self, group_name: &str) -> String {
        self.qualify(&self.group_expression, group_name)
    }

    pub fn qualify_subject_address(&self, subject_id: &str) -> String {
        self.qualify(&self.subject_expression, subject_id)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn qualify(&self, expression: &str, identifier: &str) -> String {
        let flattened = identifier.replace(TREE_SEPARATOR, "_");
        let local_part = expression.replace(ID_TOKEN, &flattened);
        format!("{}@{}", local_part, self.domain)
    }
}
