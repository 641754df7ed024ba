//! Hosted zone API
//!
//! [`ZoneApi`] is the two calls the adapter needs from Route 53: list record
//! sets from a starting point, and submit one change. [`AwsZoneApi`] backs it
//! with the AWS SDK; credentials and region come from the SDK's default
//! provider chain.

use crate::plan::{ChangeAction, RecordChange, RecordSet};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::{
    Change, ChangeAction as AwsChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet,
    RrType,
};
use srvsync_core::{Error, Result};

const PROVIDER: &str = "route53";

/// Remote hosted zone operations
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List record sets starting at (`start_name`, `start_type`), in zone order
    async fn list_record_sets(
        &self,
        hosted_zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: i32,
    ) -> Result<Vec<RecordSet>>;

    /// Submit a single-change batch
    async fn change_record_set(&self, hosted_zone_id: &str, change: &RecordChange) -> Result<()>;
}

/// Route 53 zone API backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct AwsZoneApi {
    client: Client,
}

impl AwsZoneApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the SDK's default configuration chain
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ZoneApi for AwsZoneApi {
    async fn list_record_sets(
        &self,
        hosted_zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: i32,
    ) -> Result<Vec<RecordSet>> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .start_record_name(start_name)
            .start_record_type(RrType::from(start_type))
            .max_items(max_items)
            .send()
            .await
            .map_err(|e| map_sdk_error("ListResourceRecordSets", e))?;

        Ok(output
            .resource_record_sets()
            .iter()
            .map(|set| RecordSet {
                name: set.name().to_string(),
                record_type: set.r#type().as_str().to_string(),
                ttl: set.ttl(),
                values: set
                    .resource_records()
                    .iter()
                    .map(|record| record.value().to_string())
                    .collect(),
            })
            .collect())
    }

    async fn change_record_set(&self, hosted_zone_id: &str, change: &RecordChange) -> Result<()> {
        let records = change
            .values
            .iter()
            .map(|value| ResourceRecord::builder().value(value).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_build_error)?;

        let record_set = ResourceRecordSet::builder()
            .name(&change.name)
            .r#type(RrType::Srv)
            .ttl(change.ttl)
            .set_resource_records(Some(records))
            .build()
            .map_err(map_build_error)?;

        let action = match change.action {
            ChangeAction::Upsert => AwsChangeAction::Upsert,
            ChangeAction::Delete => AwsChangeAction::Delete,
        };

        let batch = ChangeBatch::builder()
            .changes(
                Change::builder()
                    .action(action)
                    .resource_record_set(record_set)
                    .build()
                    .map_err(map_build_error)?,
            )
            .build()
            .map_err(map_build_error)?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| map_sdk_error("ChangeResourceRecordSets", e))?;

        Ok(())
    }
}

fn map_build_error(e: BuildError) -> Error {
    Error::provider(PROVIDER, format!("Invalid request: {}", e))
}

fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_owned);
    let detail = DisplayErrorContext(&err).to_string();
    classify(operation, code.as_deref(), detail)
}

/// Map a Route 53 error code onto the core error kinds
fn classify(operation: &str, code: Option<&str>, detail: String) -> Error {
    let message = format!("{} failed: {}", operation, detail);
    match code {
        Some("Throttling" | "ThrottlingException" | "PriorRequestNotComplete") => {
            Error::rate_limited(message)
        }
        Some("NoSuchHostedZone") => Error::not_found(message),
        Some("InvalidChangeBatch" | "InvalidInput") => Error::invalid_input(message),
        Some(
            "AccessDenied"
            | "AccessDeniedException"
            | "InvalidClientTokenId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken",
        ) => Error::auth(message),
        _ => Error::provider(PROVIDER, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert!(matches!(
            classify("ListResourceRecordSets", Some("Throttling"), "slow".into()),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            classify("ListResourceRecordSets", Some("NoSuchHostedZone"), "gone".into()),
            Error::NotFound(_)
        ));
        assert!(matches!(
            classify("ChangeResourceRecordSets", Some("InvalidChangeBatch"), "bad".into()),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            classify("ChangeResourceRecordSets", Some("AccessDenied"), "no".into()),
            Error::Authentication(_)
        ));
    }

    #[test]
    fn test_classify_unknown_is_provider_error() {
        let err = classify("ListResourceRecordSets", None, "dispatch failure".into());
        assert_eq!(
            err.to_string(),
            "Provider error (route53): ListResourceRecordSets failed: dispatch failure"
        );
    }
}
