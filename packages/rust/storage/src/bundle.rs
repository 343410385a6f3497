//! Transactional save of a structured document together with its parent
//! entity's SEO settings.

use resolvekit_shared::{ResolveKitError, Result, StructuredComplaintDocument};
use serde::Serialize;
use tracing::{info, instrument};

use crate::complaints::put_complaint;
use crate::seo::{SeoSettings, SeoUpsert, put_seo};
use crate::{Storage, finish};

/// What a bundle save changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutcome {
    pub document: StructuredComplaintDocument,
    pub document_written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoSettings>,
    pub seo_written: bool,
}

impl Storage {
    /// Write both halves or neither. Re-saving an identical bundle writes nothing.
    #[instrument(skip(self, document, seo))]
    pub async fn save_bundle(
        &self,
        entity_id: &str,
        document: &StructuredComplaintDocument,
        seo: Option<&SeoUpsert>,
    ) -> Result<BundleOutcome> {
        let (_guard, tx) = self.begin().await?;

        let result = async {
            let document_written = put_complaint(&tx, entity_id, document).await?;
            let (seo, seo_written) = match seo {
                Some(upsert) => {
                    let (settings, written) = put_seo(&tx, upsert).await?;
                    (Some(settings), written)
                }
                None => (None, false),
            };
            Ok::<_, ResolveKitError>(BundleOutcome {
                document: document.clone(),
                document_written,
                seo,
                seo_written,
            })
        }
        .await;

        let outcome = finish(tx, result).await?;
        info!(
            entity_id,
            document_written = outcome.document_written,
            seo_written = outcome.seo_written,
            "bundle saved"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use resolvekit_shared::ProcessingStatus;

    fn doc() -> StructuredComplaintDocument {
        StructuredComplaintDocument {
            rich_text_content: "<p>Visit a branch.</p>".into(),
            processing_status: ProcessingStatus::Fallback,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn writes_both_halves() {
        let storage = test_storage().await;
        let seo = SeoUpsert::new("company", "acme").field("title", "Acme");
        let outcome = storage.save_bundle("acme", &doc(), Some(&seo)).await.expect("save");

        assert!(outcome.document_written);
        assert!(outcome.seo_written);
        assert!(storage.get_complaint("acme").await.expect("get").is_some());
        assert!(storage.find_seo("company", "acme").await.expect("find").is_some());
    }

    #[tokio::test]
    async fn identical_bundle_is_a_no_op() {
        let storage = test_storage().await;
        let seo = SeoUpsert::new("company", "acme").field("title", "Acme");
        storage.save_bundle("acme", &doc(), Some(&seo)).await.expect("first");
        let again = storage.save_bundle("acme", &doc(), Some(&seo)).await.expect("second");
        assert!(!again.document_written);
        assert!(!again.seo_written);
    }

    #[tokio::test]
    async fn failed_seo_half_rolls_back_document() {
        let storage = test_storage().await;
        let invalid = SeoUpsert::new("company", "");
        let result = storage.save_bundle("acme", &doc(), Some(&invalid)).await;
        assert!(result.is_err());
        assert_eq!(storage.get_complaint("acme").await.expect("get"), None);
    }

    #[tokio::test]
    async fn document_only_bundle() {
        let storage = test_storage().await;
        let outcome = storage.save_bundle("acme", &doc(), None).await.expect("save");
        assert!(outcome.document_written);
        assert!(outcome.seo.is_none());
    }
}
