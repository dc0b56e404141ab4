//! Allow-list capability descriptors.

/// The allow-lists a host object declares for sandboxed access.
///
/// Reads are allowed for the union of every list; writes only for
/// `api_user_properties`. A descriptor with neither `api_properties` nor
/// `api_methods` declares no read policy at all, which denies every read.
/// That is distinct from declaring empty lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiPolicy {
    pub api_properties: Option<Vec<String>>,
    pub api_user_properties: Option<Vec<String>>,
    pub api_methods: Option<Vec<String>>,
    pub api_own_methods: Option<Vec<String>>,
    pub programmable_properties: Option<Vec<String>>,
}

fn names<I, S>(names: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(names.into_iter().map(Into::into).collect())
}

impl ApiPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn properties<I: IntoIterator<Item = S>, S: Into<String>>(mut self, list: I) -> Self {
        self.api_properties = names(list);
        self
    }

    #[must_use]
    pub fn user_properties<I: IntoIterator<Item = S>, S: Into<String>>(mut self, list: I) -> Self {
        self.api_user_properties = names(list);
        self
    }

    #[must_use]
    pub fn methods<I: IntoIterator<Item = S>, S: Into<String>>(mut self, list: I) -> Self {
        self.api_methods = names(list);
        self
    }

    #[must_use]
    pub fn own_methods<I: IntoIterator<Item = S>, S: Into<String>>(mut self, list: I) -> Self {
        self.api_own_methods = names(list);
        self
    }

    #[must_use]
    pub fn programmable_properties<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        list: I,
    ) -> Self {
        self.programmable_properties = names(list);
        self
    }

    /// Every readable name, in declaration order, or `None` when no read
    /// policy is declared.
    pub fn read_list(&self) -> Option<Vec<&str>> {
        if self.api_properties.is_none() && self.api_methods.is_none() {
            return None;
        }
        let lists = [
            &self.api_properties,
            &self.api_user_properties,
            &self.api_methods,
            &self.api_own_methods,
            &self.programmable_properties,
        ];
        Some(
            lists
                .into_iter()
                .flatten()
                .flatten()
                .map(String::as_str)
                .collect(),
        )
    }

    pub fn write_list(&self) -> &[String] {
        self.api_user_properties.as_deref().unwrap_or_default()
    }

    pub fn allows_read(&self, name: &str) -> bool {
        self.read_list().is_some_and(|list| list.contains(&name))
    }

    pub fn allows_write(&self, name: &str) -> bool {
        self.write_list().iter().any(|allowed| allowed == name)
    }
}
