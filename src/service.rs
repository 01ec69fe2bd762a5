use std::fmt;

/// The processes this crate builds, one binary each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// `GET /api/books`
    List,
    /// `POST /api/books`
    Create,
    /// `PUT /api/books`
    Update,
    /// `DELETE /api/books/:id`
    Delete,
    /// Server-side rendered HTML views.
    Frontend,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::List => "books-get",
            Service::Create => "books-post",
            Service::Update => "books-put",
            Service::Delete => "books-delete",
            Service::Frontend => "frontend",
        }
    }

    /// Every service listens on its own port so they can run side by side behind the proxy.
    pub fn default_port(&self) -> u16 {
        match self {
            Service::Frontend => 3030,
            Service::List => 3031,
            Service::Create => 3032,
            Service::Update => 3033,
            Service::Delete => 3034,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
