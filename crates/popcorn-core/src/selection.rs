/// Which title's details are open, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selecting the open title again closes it; anything else switches to it
    pub fn select(&mut self, imdb_id: &str) {
        if self.current.as_deref() == Some(imdb_id) {
            self.current = None;
        } else {
            self.current = Some(imdb_id.to_string());
        }
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
