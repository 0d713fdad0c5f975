//! Listing continuation state.

/// Position of a paginated listing.
///
/// A traversal starts [`Fresh`](Self::Fresh), moves to
/// [`Active`](Self::Active) while the provider keeps returning continuation
/// tokens and ends [`Exhausted`](Self::Exhausted) once it signals the last
/// page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListCursor {
    /// No page has been fetched yet.
    #[default]
    Fresh,
    /// More pages remain; holds the provider's continuation token.
    Active(String),
    /// The last page has been delivered.
    Exhausted,
}

impl ListCursor {
    /// Continuation token to send with the next request, if any.
    pub fn token(&self) -> &str {
        match self {
            Self::Active(token) => token,
            Self::Fresh | Self::Exhausted => "",
        }
    }

    /// Records the token returned with a page. An empty token ends the
    /// traversal.
    pub fn advance(&mut self, token: impl Into<String>) {
        let token = token.into();
        *self = if token.is_empty() {
            Self::Exhausted
        } else {
            Self::Active(token)
        };
    }

    /// Starts a new traversal.
    pub fn reset(&mut self) {
        *self = Self::Fresh;
    }

    /// Returns `true` when no further pages remain.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    /// Returns `true` while a continuation token is held.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}
