use super::SearchPattern;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, AuthorNameEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(AuthorNameEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
#[error("Author name cannot be empty")]
pub struct AuthorNameEmptyError;

#[derive(Debug, Clone)]
pub struct Author {
    id: i64,
    name: AuthorName,
}

impl Author {
    pub const fn new(id: i64, name: AuthorName) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Debug)]
pub struct CreateAuthorRequest {
    name: AuthorName,
}

impl CreateAuthorRequest {
    pub const fn new(name: AuthorName) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateAuthorError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct FindAuthorRequest {
    id: i64,
}

impl FindAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug, Default)]
pub struct AuthorFilter {
    name: Option<SearchPattern>,
}

impl AuthorFilter {
    pub const fn new(name: Option<SearchPattern>) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> Option<&SearchPattern> {
        self.name.as_ref()
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAuthorsError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct UpdateAuthorRequest {
    id: i64,
    name: AuthorName,
}

impl UpdateAuthorRequest {
    pub const fn new(id: i64, name: AuthorName) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Error, Debug)]
pub enum UpdateAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct DeleteAuthorRequest {
    id: i64,
}

impl DeleteAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum DeleteAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error("Author with id \"{id}\" still has {count} book(s)")]
    HasBooks { id: i64, count: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
