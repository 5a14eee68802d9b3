//! Multipart form data

/// Form entries in insertion order
#[derive(Debug, Clone, Default)]
pub struct FormData {
    entries: Vec<(String, FormDataValue)>,
}

/// FormData value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormDataValue {
    Text(String),
    File { name: String, content: Vec<u8>, content_type: String },
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), FormDataValue::Text(value.to_string())));
    }

    pub fn append_file(&mut self, name: &str, filename: &str, content: Vec<u8>, content_type: &str) {
        self.entries.push((name.to_string(), FormDataValue::File {
            name: filename.to_string(),
            content,
            content_type: content_type.to_string(),
        }));
    }

    pub fn get(&self, name: &str) -> Option<&FormDataValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Text value of a field
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FormDataValue::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// File part of a field: (filename, content)
    pub fn file(&self, name: &str) -> Option<(&str, &[u8])> {
        match self.get(name) {
            Some(FormDataValue::File { name, content, .. }) => Some((name, content)),
            _ => None,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FormDataValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}
