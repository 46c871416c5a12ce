//! `META-INF/container.xml` parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::util::{local_name, strip_bom};

/// Fixed location of the container descriptor inside an EPUB.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Parse META-INF/container.xml to find the package document path.
///
/// Returns the `full-path` of the first `rootfile` element, matched by local
/// name so prefixed documents (`<odf:rootfile>`) work too.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = std::str::from_utf8(strip_bom(bytes))
        .map_err(|e| Error::Parse(format!("{CONTAINER_PATH}: {e}")))?;

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"full-path" && !attr.value.is_empty() {
                        let raw = String::from_utf8(attr.value.to_vec())
                            .map_err(|e| Error::Parse(format!("{CONTAINER_PATH}: {e}")))?;
                        return Ok(raw);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("{CONTAINER_PATH}: {e}"))),
            _ => {}
        }
    }

    Err(Error::Parse(format!(
        "no rootfile with a full-path in {CONTAINER_PATH}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container = br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

        assert_eq!(parse_container_xml(container).unwrap(), "OEBPS/content.opf");
    }

    #[test]
    fn test_parse_container_xml_with_bom() {
        let mut container = vec![0xEF, 0xBB, 0xBF];
        container.extend_from_slice(
            br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
        );

        assert_eq!(parse_container_xml(&container).unwrap(), "content.opf");
    }

    #[test]
    fn test_attribute_order_and_prefix_do_not_matter() {
        let container = br#"<odf:container xmlns:odf="urn:oasis:names:tc:opendocument:xmlns:container">
  <!-- leading comment -->
  <odf:rootfiles>
    <odf:rootfile media-type="application/oebps-package+xml" full-path="book/package.opf"></odf:rootfile>
  </odf:rootfiles>
</odf:container>"#;

        assert_eq!(parse_container_xml(container).unwrap(), "book/package.opf");
    }

    #[test]
    fn test_missing_rootfile() {
        let container = br#"<container><rootfiles/></container>"#;
        assert!(matches!(
            parse_container_xml(container),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_container() {
        let container = br#"<container><rootfiles></container>"#;
        assert!(matches!(
            parse_container_xml(container),
            Err(Error::Parse(_))
        ));
    }
}
