// Ring 4: derive the URL slug from the bootcamp name
use async_trait::async_trait;

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{EnrichmentObserver, Observer, ObserverRing};
use crate::types::Operation;

#[derive(Default)]
pub struct BootcampSlug;

/// Lowercase, with every run of non-alphanumeric characters collapsed to a
/// single hyphen and no leading or trailing hyphen
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

impl Observer for BootcampSlug {
    fn name(&self) -> &'static str {
        "BootcampSlug"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Bootcamps
    }
}

#[async_trait]
impl EnrichmentObserver for BootcampSlug {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let slug = ctx.get_str("name").map(slugify);
        if let Some(slug) = slug {
            ctx.set("slug", slug);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::observer_context;
    use serde_json::json;

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
        assert_eq!(slugify("  UI/UX -- Academy! "), "ui-ux-academy");
        assert_eq!(slugify("Codemasters"), "codemasters");
    }

    #[tokio::test]
    async fn sets_slug_from_name() {
        let mut ctx = observer_context(Collection::Bootcamps, json!({ "name": "ModernTech Bootcamp" }));
        BootcampSlug.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.get_str("slug"), Some("moderntech-bootcamp"));
    }
}
