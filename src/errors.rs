error_set::error_set! {

    /// An error moving a schema across the json boundary, not an error sanitizing it.
    /// Sanitizing never fails.
    /// The display message for this type is human/llm readable.
    SchemaError = {
        #[display("The schema at `{path}` is not a json object")]
        NotAnObject {
            path: String,
        },
        #[display("The `{keyword}` keyword at `{path}` is not valid: {issue}")]
        InvalidKeyword {
            path: String,
            keyword: String,
            issue: String,
        },
        /// Only local pointers into the same document are followed.
        #[display("The reference `{pointer}` at `{path}` is not a local `#/$defs/..` or `#/definitions/..` pointer")]
        UnsupportedRef {
            path: String,
            pointer: String,
        },
        #[display("The reference `{pointer}` at `{path}` does not point to any definition")]
        UnresolvedRef {
            path: String,
            pointer: String,
        },
        #[display("The reference `{pointer}` only aliases other references and never reaches a schema")]
        RefCycle {
            pointer: String,
        },
        #[display("The schema at `{path}` refers back to one of its ancestors and cannot be written out inline")]
        CyclicSchema {
            path: String,
        },
    };

    /// An error loading [`crate::SanitizeOptions`] from the environment.
    ConfigError = {
        #[display("`{key}` contains an empty format entry in `{value}`")]
        EmptyFormat {
            key: String,
            value: String,
        },
    };
}

impl SchemaError {
    pub(crate) fn invalid_keyword(path: &str, keyword: &str, issue: impl Into<String>) -> Self {
        Self::InvalidKeyword {
            path: path.to_owned(),
            keyword: keyword.to_owned(),
            issue: issue.into(),
        }
    }
}
