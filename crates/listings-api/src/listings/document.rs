//! JSON document helpers for listing bodies
//!
//! Listings are stored as free-form JSON. These helpers enforce the handful
//! of structural rules the service relies on: the identifier field, the
//! creation stamp, the media skeleton and merge-style partial updates.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::category::{ListingCategory, MediaLayout};
use crate::error::{Error, Result};

/// Field holding the property ID in every listing document
pub const PROPERTY_ID_FIELD: &str = "propertyId";

/// Keys that belong to the storage layer and never enter a document
const INTERNAL_KEYS: [&str; 2] = ["_id", "__v"];

/// Photo buckets of apartment listings
pub const APARTMENT_PHOTO_BUCKETS: [&str; 10] = [
    "exterior",
    "interior",
    "floorPlan",
    "washrooms",
    "lifts",
    "emergencyExits",
    "bedrooms",
    "halls",
    "storerooms",
    "kitchen",
];

/// Merge `source` into `target`
///
/// Objects merge key by key and arrays merge index by index, recursively.
/// Any other source value, `null` included, replaces the target value.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (index, value) in source.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => deep_merge(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Remove storage-internal keys at every depth
pub fn strip_internal_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in INTERNAL_KEYS {
                map.remove(key);
            }
            map.values_mut().for_each(strip_internal_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_internal_keys),
        _ => {}
    }
}

/// Clean a PATCH payload before it is merged into a stored document
///
/// The property ID is immutable, so a top-level `propertyId` is dropped.
pub fn prepare_update(mut data: Value) -> Result<Value> {
    if !data.is_object() {
        return Err(Error::invalid("data must be a JSON object"));
    }

    strip_internal_keys(&mut data);
    if let Some(map) = data.as_object_mut() {
        map.remove(PROPERTY_ID_FIELD);
    }

    Ok(data)
}

/// Build the stored form of a newly created listing
///
/// Any client-supplied property ID is discarded; the caller sets the
/// allocated one with [`set_property_id`].
pub fn prepare_new_document(
    category: ListingCategory,
    body: Value,
    created_at: DateTime<Utc>,
) -> Result<Value> {
    let Value::Object(mut doc) = body else {
        return Err(Error::invalid("listing body must be a JSON object"));
    };

    for key in INTERNAL_KEYS {
        doc.remove(key);
    }
    doc.remove(PROPERTY_ID_FIELD);

    let metadata = object_entry(&mut doc, "metadata");

    if category.requires_creator() && is_blank(metadata.get("createdBy")) {
        return Err(Error::invalid("metadata.createdBy is required"));
    }

    metadata.insert(
        "createdAt".to_string(),
        Value::String(format_timestamp(created_at)),
    );

    let mut doc = Value::Object(doc);
    strip_internal_keys(&mut doc);
    ensure_media_skeleton(category, &mut doc);

    Ok(doc)
}

/// Fill in missing parts of the `media` section for `category`
///
/// `media.mediaItems` is always left as an array.
pub fn ensure_media_skeleton(category: ListingCategory, doc: &mut Value) {
    let Some(doc) = doc.as_object_mut() else {
        return;
    };
    let media = object_entry(doc, "media");

    match category.media_layout() {
        MediaLayout::Apartment => {
            let photos = object_entry(media, "photos");
            for bucket in APARTMENT_PHOTO_BUCKETS {
                photos
                    .entry(bucket)
                    .or_insert_with(|| Value::Array(Vec::new()));
            }
            media
                .entry("documents")
                .or_insert_with(|| Value::Array(Vec::new()));
            media
                .entry("videoTour")
                .or_insert_with(|| Value::String(String::new()));
        }
        MediaLayout::Flat => {
            media
                .entry("photos")
                .or_insert_with(|| Value::Array(Vec::new()));
            media
                .entry("videos")
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }

    if !media.get("mediaItems").is_some_and(Value::is_array) {
        media.insert("mediaItems".to_string(), Value::Array(Vec::new()));
    }
}

/// Media section of a fresh document of `category`
pub fn empty_media(category: ListingCategory) -> Value {
    let mut doc = Value::Object(Map::new());
    ensure_media_skeleton(category, &mut doc);
    doc.get("media").cloned().unwrap_or(Value::Null)
}

/// Write the property ID into a document
pub fn set_property_id(doc: &mut Value, property_id: &str) {
    if let Some(map) = doc.as_object_mut() {
        map.insert(
            PROPERTY_ID_FIELD.to_string(),
            Value::String(property_id.to_string()),
        );
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Get `map[key]` as an object, replacing any non-object value
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(inner) => inner,
        _ => unreachable!("entry was just set to an object"),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_deep_merge_objects_recurse() {
        let mut target = json!({
            "price": 100,
            "basicInformation": { "title": "Plot", "address": { "city": "Pune", "state": "MH" } }
        });
        deep_merge(
            &mut target,
            json!({ "basicInformation": { "address": { "city": "Mumbai" } }, "area": 500 }),
        );

        assert_eq!(
            target,
            json!({
                "price": 100,
                "area": 500,
                "basicInformation": { "title": "Plot", "address": { "city": "Mumbai", "state": "MH" } }
            })
        );
    }

    #[test]
    fn test_deep_merge_arrays_by_index() {
        let mut target = json!({ "tags": ["a", "b", "c"], "rooms": [{ "name": "hall", "size": 10 }] });
        deep_merge(
            &mut target,
            json!({ "tags": ["x"], "rooms": [{ "size": 12 }, { "name": "kitchen" }] }),
        );

        assert_eq!(
            target,
            json!({
                "tags": ["x", "b", "c"],
                "rooms": [{ "name": "hall", "size": 12 }, { "name": "kitchen" }]
            })
        );
    }

    #[test]
    fn test_deep_merge_scalars_and_null_overwrite() {
        let mut target = json!({ "price": 100, "furnished": true, "notes": { "a": 1 } });
        deep_merge(
            &mut target,
            json!({ "price": "negotiable", "furnished": null, "notes": 7 }),
        );
        assert_eq!(
            target,
            json!({ "price": "negotiable", "furnished": null, "notes": 7 })
        );
    }

    #[test]
    fn test_strip_internal_keys_recursively() {
        let mut value = json!({
            "_id": "abc",
            "__v": 3,
            "media": { "_id": "m", "mediaItems": [{ "_id": "i", "url": "u" }] }
        });
        strip_internal_keys(&mut value);
        assert_eq!(value, json!({ "media": { "mediaItems": [{ "url": "u" }] } }));
    }

    #[test]
    fn test_prepare_update() {
        let data = prepare_update(json!({
            "propertyId": "RA-COMREPL9999",
            "_id": "x",
            "details": { "propertyId": "nested stays", "__v": 1 }
        }))
        .unwrap();

        assert_eq!(data, json!({ "details": { "propertyId": "nested stays" } }));
        assert!(prepare_update(json!([1, 2])).is_err());
    }

    #[test]
    fn test_new_commercial_document_requires_creator() {
        let err = prepare_new_document(
            ListingCategory::CommercialRentPlot,
            json!({ "metadata": {} }),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));

        let err = prepare_new_document(
            ListingCategory::CommercialSalePlot,
            json!({ "metadata": { "createdBy": "  " } }),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));

        let doc = prepare_new_document(
            ListingCategory::CommercialRentPlot,
            json!({ "metadata": { "createdBy": "user-1" }, "propertyId": "CLIENT-1" }),
            now(),
        )
        .unwrap();
        assert_eq!(doc["metadata"]["createdBy"], "user-1");
        assert_eq!(doc["metadata"]["createdAt"], "2024-03-01T10:30:00.000Z");
        assert!(doc.get("propertyId").is_none());
    }

    #[test]
    fn test_apartment_skeleton() {
        let doc = prepare_new_document(
            ListingCategory::ResidentialRentApartment,
            json!({ "title": "2BHK" }),
            now(),
        )
        .unwrap();

        let media = &doc["media"];
        for bucket in APARTMENT_PHOTO_BUCKETS {
            assert_eq!(media["photos"][bucket], json!([]), "{bucket}");
        }
        assert_eq!(media["documents"], json!([]));
        assert_eq!(media["videoTour"], "");
        assert_eq!(media["mediaItems"], json!([]));
    }

    #[test]
    fn test_apartment_skeleton_keeps_existing_media() {
        let doc = prepare_new_document(
            ListingCategory::ResidentialSaleApartment,
            json!({ "media": { "photos": { "kitchen": ["k.jpg"] }, "videoTour": "tour.mp4", "mediaItems": "bogus" } }),
            now(),
        )
        .unwrap();

        let media = &doc["media"];
        assert_eq!(media["photos"]["kitchen"], json!(["k.jpg"]));
        assert_eq!(media["photos"]["halls"], json!([]));
        assert_eq!(media["videoTour"], "tour.mp4");
        assert_eq!(media["mediaItems"], json!([]));
    }

    #[test]
    fn test_flat_skeleton() {
        assert_eq!(
            empty_media(ListingCategory::ResidentialPg),
            json!({ "photos": [], "videos": [], "mediaItems": [] })
        );
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(prepare_new_document(ListingCategory::ResidentialPg, json!("text"), now()).is_err());
    }

    #[test]
    fn test_set_property_id() {
        let mut doc = json!({ "title": "x" });
        set_property_id(&mut doc, "RA-RESPGMN0003");
        assert_eq!(doc["propertyId"], "RA-RESPGMN0003");
    }
}
