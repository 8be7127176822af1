//! Part names inside an OPC package.
//!
//! Part names are absolute, slash-separated paths ("/xl/workbook.xml"). The ZIP
//! member holding a part uses the same path without its leading slash.

/// An absolute part name such as `/xl/worksheets/sheet1.xml`.
///
/// Relationship targets found in `.rels` parts are resolved into a `PackURI`
/// before the matching ZIP member is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Wrap an absolute part name; anything not starting with `/` is rejected.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("part name must be absolute, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a relationship target and the base URI of its source part.
    ///
    /// Relative targets (like "worksheets/sheet1.xml" or "../styles.xml") are joined
    /// onto `base_uri` (like "/xl"). Absolute targets ("/xl/worksheets/sheet1.xml")
    /// are taken as they are.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else {
            Self::join_paths(base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Directory of the part: "/xl" for "/xl/workbook.xml", "/" for the package itself.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Last path segment; empty for the package itself.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Name of the ZIP member holding this part.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// The relationship part describing this part's outgoing relationships:
    /// "/xl/_rels/workbook.xml.rels" for "/xl/workbook.xml", "/_rels/.rels" for the package.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let dir = match self.base_uri() {
            "/" => "",
            dir => dir,
        };
        Self::new(format!("{}/_rels/{}.rels", dir, self.filename()))
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    fn join_paths(base: &str, rel: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), rel)
    }

    /// Drop "." and empty segments and apply "..".
    fn normalize_path(path: &str) -> String {
        let segments = path.split('/').fold(Vec::new(), |mut kept, segment| {
            match segment {
                "" | "." => {},
                ".." => {
                    kept.pop();
                },
                _ => kept.push(segment),
            }
            kept
        });
        format!("/{}", segments.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// Part name standing for the package itself
pub const PACKAGE_URI: &str = "/";

/// Conventional location of the main workbook part
pub const DEFAULT_WORKBOOK_URI: &str = "/xl/workbook.xml";

/// Conventional location of the shared strings part
pub const DEFAULT_SHARED_STRINGS_URI: &str = "/xl/sharedStrings.xml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/xl/workbook.xml").is_ok());
        assert!(PackURI::new("xl/workbook.xml").is_err());
    }

    #[test]
    fn test_base_uri() {
        let uri = PackURI::new("/xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(uri.base_uri(), "/xl/worksheets");

        let root = PackURI::new("/").unwrap();
        assert_eq!(root.base_uri(), "/");
    }

    #[test]
    fn test_membername() {
        let uri = PackURI::new("/xl/workbook.xml").unwrap();
        assert_eq!(uri.membername(), "xl/workbook.xml");

        let root = PackURI::new("/").unwrap();
        assert_eq!(root.membername(), "");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/xl/workbook.xml").unwrap();
        assert_eq!(uri.rels_uri().unwrap().as_str(), "/xl/_rels/workbook.xml.rels");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/xl", "worksheets/sheet2.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/worksheets/sheet2.xml");

        let uri = PackURI::from_rel_ref("/xl/worksheets", "../sharedStrings.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/sharedStrings.xml");

        let uri = PackURI::from_rel_ref("/xl", "/xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/worksheets/sheet1.xml");

        let uri = PackURI::from_rel_ref("/", "xl/workbook.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/workbook.xml");
    }
}
