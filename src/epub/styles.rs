//! Stylesheet collection from the manifest.

use tracing::debug;

use super::archive::PackageContext;
use super::opf::{Manifest, ManifestItem};
use crate::error::Result;

/// Media type of CSS stylesheets in the manifest.
pub const CSS_MEDIA_TYPE: &str = "text/css";

pub fn is_stylesheet(item: &ManifestItem) -> bool {
    item.media_type == CSS_MEDIA_TYPE
}

/// Concatenate every stylesheet of the manifest into one string.
///
/// Sheets are appended in manifest order with no separator between them.
pub fn collect_stylesheet(ctx: &PackageContext, manifest: &Manifest) -> Result<String> {
    let mut css = String::new();
    for item in manifest.items().iter().filter(|item| is_stylesheet(item)) {
        let content = ctx.read_text(&item.href)?;
        debug!(href = %item.href, bytes = content.len(), "collected stylesheet");
        css.push_str(&content);
    }
    Ok(css)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::epub::opf::parse_opf;
    use crate::error::Error;

    const OPF: &str = r#"<package>
  <manifest>
    <item id="b" href="css/b.css" media-type="text/css"/>
    <item id="page" href="page.xhtml" media-type="application/xhtml+xml"/>
    <item id="a" href="css/a.css" media-type="text/css"/>
  </manifest>
  <spine><itemref idref="page"/></spine>
</package>"#;

    #[test]
    fn test_concatenates_in_manifest_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("OEBPS/css")).unwrap();
        std::fs::write(dir.path().join("OEBPS/css/a.css"), "p{color:red}").unwrap();
        std::fs::write(dir.path().join("OEBPS/css/b.css"), "h1{color:blue}").unwrap();

        let ctx = PackageContext::new(dir.path(), "OEBPS/content.opf");
        let manifest = parse_opf(OPF).unwrap();

        let css = collect_stylesheet(&ctx, &manifest).unwrap();
        assert_eq!(css, "h1{color:blue}p{color:red}");
    }

    #[test]
    fn test_missing_stylesheet() {
        let dir = TempDir::new().unwrap();
        let ctx = PackageContext::new(dir.path(), "content.opf");
        let manifest = parse_opf(OPF).unwrap();

        assert!(matches!(
            collect_stylesheet(&ctx, &manifest),
            Err(Error::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_no_stylesheets() {
        let dir = TempDir::new().unwrap();
        let ctx = PackageContext::new(dir.path(), "content.opf");
        let manifest = parse_opf(
            r#"<package><manifest><item id="p" href="p.xhtml" media-type="application/xhtml+xml"/></manifest><spine><itemref idref="p"/></spine></package>"#,
        )
        .unwrap();

        assert_eq!(collect_stylesheet(&ctx, &manifest).unwrap(), "");
    }
}
