use serde::Serialize;

/// Optional list filters, combined with logical AND.
///
/// `name` matches by case-insensitive substring; `status`, `species` and
/// `gender` match by exact value, ignoring ASCII case. Blank values are
/// treated as absent; fields are only set through the normalizing
/// constructors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CharacterFilter {
    name: Option<String>,
    status: Option<String>,
    species: Option<String>,
    gender: Option<String>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CharacterFilter {
    pub fn new(
        name: Option<String>,
        status: Option<String>,
        species: Option<String>,
        gender: Option<String>,
    ) -> Self {
        Self {
            name: normalize(name),
            status: normalize(status),
            species: normalize(species),
            gender: normalize(gender),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = normalize(Some(name.into()));
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = normalize(Some(status.into()));
        self
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = normalize(Some(species.into()));
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = normalize(Some(gender.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn species(&self) -> Option<&str> {
        self.species.as_deref()
    }

    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    /// The "default browse" case: no predicate at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.species.is_none() && self.gender.is_none()
    }

    /// Evaluate the predicate against field values in memory.
    pub fn matches(&self, name: &str, status: &str, species: &str, gender: &str) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |n| name.to_ascii_lowercase().contains(&n.to_ascii_lowercase()));
        let eq = |want: &Option<String>, have: &str| {
            want.as_deref().map_or(true, |w| w.eq_ignore_ascii_case(have))
        };

        name_ok && eq(&self.status, status) && eq(&self.species, species) && eq(&self.gender, gender)
    }

    /// Query-string pairs for the remote list endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.as_str()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str()));
        }
        if let Some(species) = &self.species {
            pairs.push(("species", species.as_str()));
        }
        if let Some(gender) = &self.gender {
            pairs.push(("gender", gender.as_str()));
        }
        pairs
    }
}
