//! Sub-resource synchronizers
//!
//! Each synchronizer owns the write/read cycle of one optional association
//! group attached to a CI. Writes are full replacements; sub-resources are
//! never deleted on their own.

use async_trait::async_trait;
use tracing::debug;

use crate::client::{
    RemoteCall, ServiceCloudRecord, UpdateAtRequest, UpdateServiceCloudRequest,
    UpdateUseAndKeyDateRequest,
};
use crate::codec;
use crate::error::{ReconcileError, ReconcileResult, remote};
use crate::model::ci::defaults;
use crate::model::{KeyDates, ServiceAt, ServiceCloud};
use crate::session::Session;

/// Write/read cycle of one CI sub-resource.
#[async_trait]
pub trait SubResourceSync: Send + Sync {
    type Record: Send + Sync;

    fn name(&self) -> &'static str;

    /// Send the desired record. Returns `false` when nothing was sent.
    async fn push(&self, session: &Session, ci_id: &str, desired: &Self::Record)
    -> ReconcileResult<bool>;

    /// Fetch and decode the current record.
    async fn pull(&self, session: &Session, ci_id: &str) -> ReconcileResult<Self::Record>;
}

pub(crate) fn decode_list(field: &'static str, text: &str) -> ReconcileResult<Vec<i64>> {
    codec::decode(text).map_err(|source| ReconcileError::MalformedAssociation { field, source })
}

/// Service Cloud subscription, product and region.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceCloudSync;

impl ServiceCloudSync {
    /// Wire request for `desired`, or `None` when the subscription is not positive.
    pub fn request(ci_id: &str, desired: &ServiceCloud) -> Option<UpdateServiceCloudRequest> {
        if desired.subscription_id <= 0 {
            return None;
        }

        Some(UpdateServiceCloudRequest {
            id: ci_id.to_string(),
            subscription_id: desired.subscription_id,
            product_id: Some(desired.product_id).filter(|id| *id > 0),
            region_id: desired
                .region_id
                .filter(|id| *id > 0)
                .map(|id| id.to_string()),
        })
    }

    /// Decode the wire record; an empty or non-positive region is absent.
    pub fn decode(record: ServiceCloudRecord) -> ReconcileResult<ServiceCloud> {
        let region_id = match record.region_id.trim() {
            "" => None,
            raw => {
                let region = raw
                    .parse::<i64>()
                    .map_err(|_| ReconcileError::MalformedField {
                        field: "service_cloud.region_id",
                        value: record.region_id.clone(),
                    })?;
                Some(region).filter(|id| *id > 0)
            }
        };

        Ok(ServiceCloud {
            subscription_id: record.subscription_id,
            product_id: record.product_id,
            region_id,
        })
    }
}

#[async_trait]
impl SubResourceSync for ServiceCloudSync {
    type Record = ServiceCloud;

    fn name(&self) -> &'static str {
        "service_cloud"
    }

    async fn push(
        &self,
        session: &Session,
        ci_id: &str,
        desired: &ServiceCloud,
    ) -> ReconcileResult<bool> {
        let Some(request) = Self::request(ci_id, desired) else {
            debug!(
                ci_id = %ci_id,
                subscription_id = %desired.subscription_id,
                "Skipping Service Cloud update without a positive subscription"
            );
            return Ok(false);
        };

        session
            .api()
            .ci_update_service_cloud(&request)
            .await
            .map_err(remote(RemoteCall::CiUpdateServiceCloud))?;
        Ok(true)
    }

    async fn pull(&self, session: &Session, ci_id: &str) -> ReconcileResult<ServiceCloud> {
        let record = session
            .api()
            .ci_read_service_cloud(ci_id)
            .await
            .map_err(remote(RemoteCall::CiReadServiceCloud))?;
        Self::decode(record)
    }
}

/// Use and key dates: environments and functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDatesSync;

impl KeyDatesSync {
    pub fn request(ci_id: &str, desired: &KeyDates) -> UpdateUseAndKeyDateRequest {
        UpdateUseAndKeyDateRequest {
            id: ci_id.to_string(),
            env_select: defaults::KEY_DATE_SELECTOR,
            environment_ids: codec::encode(&desired.environment_ids),
            func_select: defaults::KEY_DATE_SELECTOR,
            function_ids: codec::encode(&desired.function_ids),
        }
    }
}

#[async_trait]
impl SubResourceSync for KeyDatesSync {
    type Record = KeyDates;

    fn name(&self) -> &'static str {
        "key_dates"
    }

    async fn push(
        &self,
        session: &Session,
        ci_id: &str,
        desired: &KeyDates,
    ) -> ReconcileResult<bool> {
        session
            .api()
            .ci_update_use_and_key_date(&Self::request(ci_id, desired))
            .await
            .map_err(remote(RemoteCall::CiUpdateUseAndKeyDate))?;
        Ok(true)
    }

    async fn pull(&self, session: &Session, ci_id: &str) -> ReconcileResult<KeyDates> {
        let record = session
            .api()
            .ci_read_use_and_key_date(ci_id)
            .await
            .map_err(remote(RemoteCall::CiReadUseAndKeyDate))?;

        Ok(KeyDates {
            environment_ids: decode_list("key_dates.environment_ids", &record.environment_ids)?,
            function_ids: decode_list("key_dates.function_ids", &record.function_ids)?,
        })
    }
}

/// Equipment AT attributes: required services and monitoring tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceAtSync;

impl ServiceAtSync {
    pub fn request(ci_id: &str, desired: &ServiceAt) -> UpdateAtRequest {
        UpdateAtRequest {
            id: ci_id.to_string(),
            required_services: codec::encode(&desired.required_services),
            monitoring_tool: codec::encode(&desired.monitoring_tool),
            backup_comment: defaults::BACKUP_COMMENT.to_string(),
        }
    }
}

#[async_trait]
impl SubResourceSync for ServiceAtSync {
    type Record = ServiceAt;

    fn name(&self) -> &'static str {
        "service_at"
    }

    async fn push(
        &self,
        session: &Session,
        ci_id: &str,
        desired: &ServiceAt,
    ) -> ReconcileResult<bool> {
        session
            .api()
            .equipment_update_at(&Self::request(ci_id, desired))
            .await
            .map_err(remote(RemoteCall::EquipmentUpdateAt))?;
        Ok(true)
    }

    async fn pull(&self, session: &Session, ci_id: &str) -> ReconcileResult<ServiceAt> {
        let record = session
            .api()
            .equipment_read_at(ci_id)
            .await
            .map_err(remote(RemoteCall::EquipmentReadAt))?;

        Ok(ServiceAt {
            required_services: decode_list(
                "service_at.required_services",
                &record.required_services,
            )?,
            monitoring_tool: decode_list("service_at.monitoring_tool", &record.monitoring_tool)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_cloud_request_requires_positive_subscription() {
        let desired = ServiceCloud {
            subscription_id: 0,
            product_id: 5,
            region_id: Some(3),
        };
        assert!(ServiceCloudSync::request("1", &desired).is_none());
    }

    #[test]
    fn test_service_cloud_request_omits_zero_region() {
        let desired = ServiceCloud {
            subscription_id: 8,
            product_id: 5,
            region_id: Some(0),
        };

        let request = ServiceCloudSync::request("1", &desired).unwrap();
        assert_eq!(request.subscription_id, 8);
        assert_eq!(request.product_id, Some(5));
        assert_eq!(request.region_id, None);

        let with_region = ServiceCloud {
            region_id: Some(12),
            ..desired
        };
        let request = ServiceCloudSync::request("1", &with_region).unwrap();
        assert_eq!(request.region_id.as_deref(), Some("12"));
    }

    #[test]
    fn test_service_cloud_decode_region() {
        let record = ServiceCloudRecord {
            subscription_id: 1,
            product_id: 2,
            region_id: String::new(),
        };
        assert_eq!(ServiceCloudSync::decode(record).unwrap().region_id, None);

        let record = ServiceCloudRecord {
            subscription_id: 1,
            product_id: 2,
            region_id: "7".to_string(),
        };
        assert_eq!(ServiceCloudSync::decode(record).unwrap().region_id, Some(7));

        let record = ServiceCloudRecord {
            subscription_id: 1,
            product_id: 2,
            region_id: "eu-west".to_string(),
        };
        assert!(matches!(
            ServiceCloudSync::decode(record),
            Err(ReconcileError::MalformedField {
                field: "service_cloud.region_id",
                ..
            })
        ));
    }

    #[test]
    fn test_key_dates_request_fixes_selectors() {
        let request = KeyDatesSync::request(
            "55",
            &KeyDates {
                environment_ids: vec![3, 1],
                function_ids: vec![],
            },
        );

        assert_eq!(request.env_select, 0);
        assert_eq!(request.func_select, 0);
        assert_eq!(request.environment_ids, "3,1");
        assert_eq!(request.function_ids, "");
    }

    #[test]
    fn test_service_at_request_carries_backup_comment() {
        let request = ServiceAtSync::request(
            "55",
            &ServiceAt {
                required_services: vec![9],
                monitoring_tool: vec![4, 6],
            },
        );

        assert_eq!(request.backup_comment, "Asset PaaS");
        assert_eq!(request.required_services, "9");
        assert_eq!(request.monitoring_tool, "4,6");
    }
}
