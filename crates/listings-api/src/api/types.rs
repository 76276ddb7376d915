//! Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use common::persistence::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::blogs::{Blog, BlogStatistics};
use crate::listings::listing_view;
use crate::media::UploadOutcome;
use crate::store::{ListingFilter, ListingRecord};

/// Pagination block of list responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Current page (1-indexed)
    pub current: u32,
    /// Number of pages
    pub total: u32,
    /// Number of matching records
    pub total_records: u64,
}

impl<T> From<&Page<T>> for PaginationInfo {
    fn from(page: &Page<T>) -> Self {
        Self {
            current: page.page_number,
            total: page.total_pages,
            total_records: page.total_count,
        }
    }
}

/// Query parameters of listing list endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Page number, default 1
    pub page: Option<u32>,
    /// Page size, default 10, at most 100
    pub limit: Option<u32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub property_type: Option<String>,
    /// Only listings whose `metadata.createdBy` matches
    pub created_by: Option<String>,
}

impl ListingQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page, self.limit)
    }

    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            city: self.city.clone(),
            state: self.state.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            bedrooms: self.bedrooms,
            property_type: self.property_type.clone(),
            created_by: self.created_by.clone(),
        }
    }
}

/// Body of a listing update
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateListingRequest {
    /// Fields merged into the stored document
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

/// A single listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[schema(value_type = Object)]
    pub data: Value,
}

impl ListingResponse {
    pub fn new(record: &ListingRecord, message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            data: listing_view(record),
        }
    }
}

/// A page of listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingListResponse {
    pub success: bool,
    /// Items on this page
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub pagination: PaginationInfo,
}

impl From<Page<ListingRecord>> for ListingListResponse {
    fn from(page: Page<ListingRecord>) -> Self {
        let pagination = PaginationInfo::from(&page);
        let data: Vec<Value> = page.items.iter().map(listing_view).collect();

        Self {
            success: true,
            count: data.len(),
            data,
            pagination,
        }
    }
}

/// Acknowledgement without a payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Media section of a listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MediaResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadOutcome,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogResponse {
    pub success: bool,
    pub data: Blog,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogStatisticsResponse {
    pub success: bool,
    pub data: BlogStatistics,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthCheckResponse {
    /// "healthy" or "degraded"
    pub status: String,

    pub version: String,

    pub timestamp: DateTime<Utc>,

    /// Whether the document store answered
    pub database_reachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::ListingCategory;
    use common::property_id::IdScheme;
    use serde_json::json;

    #[test]
    fn test_listing_query_camel_case() {
        let query: ListingQuery = serde_json::from_value(json!({
            "page": 2,
            "minPrice": 1500.0,
            "propertyType": "villa",
            "createdBy": "agent-1"
        }))
        .unwrap();

        assert_eq!(query.page_request(), PageRequest::new(2, 10));
        let filter = query.filter();
        assert_eq!(filter.min_price, Some(1500.0));
        assert_eq!(filter.property_type.as_deref(), Some("villa"));
        assert_eq!(filter.created_by.as_deref(), Some("agent-1"));
    }

    #[test]
    fn test_list_response_shape() {
        let now = Utc::now();
        let record = ListingRecord {
            property_id: "RA-RESPGMN0001".to_string(),
            id_scheme: IdScheme::Sequential,
            category: ListingCategory::ResidentialPg,
            document: json!({ "propertyId": "RA-RESPGMN0001" }),
            created_at: now,
            updated_at: now,
        };
        let page = Page::new(vec![record], &PageRequest::new(1, 1), 3);

        let body = serde_json::to_value(ListingListResponse::from(page)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);
        assert_eq!(
            body["pagination"],
            json!({ "current": 1, "total": 3, "totalRecords": 3 })
        );
        assert_eq!(body["data"][0]["propertyId"], "RA-RESPGMN0001");
    }

    #[test]
    fn test_listing_response_skips_empty_message() {
        let now = Utc::now();
        let record = ListingRecord {
            property_id: "P0001".to_string(),
            id_scheme: IdScheme::Sequential,
            category: ListingCategory::ResidentialPg,
            document: json!({}),
            created_at: now,
            updated_at: now,
        };
        let body = serde_json::to_value(ListingResponse::new(&record, None)).unwrap();
        assert!(body.get("message").is_none());
    }
}
