use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::models::{CityArea, Event, EventFields, GeoPoint, Sport, UserPatch, UserProfile};
use crate::services::storage::{Storage, StorageError};

/// Upper bound for one list call; snapshots are read in a single page
const MAX_DOCUMENTS: usize = 5000;

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub events: String,
    pub users: String,
    pub sports: String,
    pub cities: String,
}

/// Appwrite document store
///
/// Documents keep coordinates as flat `latitude`/`longitude` attributes;
/// they are nested into a `location` object on the way in and flattened
/// on the way out.
pub struct AppwriteStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

impl AppwriteStore {
    /// Create a new Appwrite store client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), urlencoding::encode(document_id))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Value, StorageError> {
        let response = self.authed(request).send().await?;
        let status = response.status();

        match status {
            s if s.is_success() => {
                if status == StatusCode::NO_CONTENT {
                    return Ok(Value::Null);
                }
                Ok(response.json().await?)
            }
            StatusCode::UNAUTHORIZED => Err(StorageError::Unauthorized),
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(what.to_string())),
            _ => {
                let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Appwrite call for {} failed: {} - {}", what, status, body);
                Err(StorageError::ApiError(format!("{}: {}", what, status)))
            }
        }
    }

    async fn list_documents(&self, collection: &str, queries: &[String]) -> Result<Vec<Value>, StorageError> {
        let mut queries = queries.to_vec();
        queries.push(format!("limit({})", MAX_DOCUMENTS));

        let query_string = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{}", self.collection_url(collection), query_string);

        tracing::debug!("Listing documents from: {}", url);

        let json = self.send(self.client.get(&url), collection).await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StorageError::InvalidResponse("Missing documents array".into()))?;

        if let Some(total) = truncated_total(&json, documents.len()) {
            tracing::warn!(
                "Listing {} returned {} of {} documents; the rest are not visible",
                collection,
                documents.len(),
                total
            );
        }

        Ok(documents.clone())
    }

    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Option<Value>, StorageError> {
        let url = self.document_url(collection, document_id);
        match self.send(self.client.get(&url), document_id).await {
            Ok(doc) => Ok(Some(doc)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_document(&self, collection: &str, document_id: &str, data: Value) -> Result<Value, StorageError> {
        let body = json!({ "documentId": document_id, "data": data });
        self.send(self.client.post(self.collection_url(collection)).json(&body), collection)
            .await
    }

    async fn update_document(&self, collection: &str, document_id: &str, data: Value) -> Result<Value, StorageError> {
        let body = json!({ "data": data });
        self.send(self.client.patch(self.document_url(collection, document_id)).json(&body), document_id)
            .await
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<(), StorageError> {
        self.send(self.client.delete(self.document_url(collection, document_id)), document_id)
            .await
            .map(|_| ())
    }
}

/// Move flat `latitude`/`longitude` attributes into a nested `location` object
fn nest_location(mut doc: Value) -> Value {
    if let Some(obj) = doc.as_object_mut() {
        let latitude = obj.remove("latitude").unwrap_or(Value::Null);
        let longitude = obj.remove("longitude").unwrap_or(Value::Null);
        // Appwrite returns unset attributes as null; both null means no location
        if !latitude.is_null() || !longitude.is_null() {
            obj.insert(
                "location".to_string(),
                json!({ "latitude": latitude, "longitude": longitude }),
            );
        }
    }
    doc
}

fn parse<T: DeserializeOwned>(doc: Value, what: &str) -> Result<T, StorageError> {
    let data = match doc.get("data") {
        Some(inner) => inner.clone(),
        None => doc,
    };
    serde_json::from_value(nest_location(data))
        .map_err(|e| StorageError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
}

/// Appwrite's reported `total` when it exceeds the documents actually returned
fn truncated_total(list: &Value, returned: usize) -> Option<u64> {
    list.get("total")
        .and_then(Value::as_u64)
        .filter(|&total| total > returned as u64)
}

/// Parse every document, skipping the ones that fail instead of failing the list
fn parse_all<T: DeserializeOwned>(documents: Vec<Value>, what: &str) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| match parse::<T>(doc, what) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping {} document: {}", what, e);
                None
            }
        })
        .collect()
}

fn event_data(fields: &EventFields) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("name".into(), json!(fields.name));
    data.insert("category".into(), json!(fields.category));
    data.insert("city".into(), json!(fields.city));
    data.insert("area".into(), json!(fields.area));
    data.insert("time".into(), json!(fields.time.to_rfc3339()));
    data.insert("latitude".into(), json!(fields.location.latitude()));
    data.insert("longitude".into(), json!(fields.location.longitude()));
    data
}

fn user_data(patch: &UserPatch) -> Result<Value, StorageError> {
    let mut value = serde_json::to_value(patch)
        .map_err(|e| StorageError::InvalidResponse(format!("Failed to encode user patch: {}", e)))?;
    if let Some(obj) = value.as_object_mut() {
        if let Some(location) = obj.remove("location") {
            obj.insert("latitude".into(), location["latitude"].clone());
            obj.insert("longitude".into(), location["longitude"].clone());
        }
    }
    Ok(value)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl Storage for AppwriteStore {
    async fn fetch_events(&self) -> Result<Vec<Event>, StorageError> {
        let documents = self.list_documents(&self.collections.events, &[]).await?;
        let total = documents.len();
        let events: Vec<Event> = parse_all(documents, "event");

        tracing::debug!("Fetched {} events ({} documents)", events.len(), total);

        Ok(events)
    }

    async fn fetch_event(&self, event_id: &str) -> Result<Option<Event>, StorageError> {
        self.get_document(&self.collections.events, event_id)
            .await?
            .map(|doc| parse(doc, "event"))
            .transpose()
    }

    async fn create_event(&self, fields: EventFields, created_by: &str) -> Result<Event, StorageError> {
        let mut data = event_data(&fields);
        data.insert("createdBy".into(), json!(created_by));
        data.insert("joinedUsers".into(), json!([]));

        let doc = self
            .create_document(&self.collections.events, &new_id(), Value::Object(data))
            .await?;
        parse(doc, "event")
    }

    async fn update_event(&self, event_id: &str, fields: EventFields) -> Result<Event, StorageError> {
        let mut data = event_data(&fields);
        data.insert("updatedAt".into(), json!(Utc::now().to_rfc3339()));

        let doc = self
            .update_document(&self.collections.events, event_id, Value::Object(data))
            .await?;
        parse(doc, "event")
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), StorageError> {
        self.delete_document(&self.collections.events, event_id).await
    }

    async fn join_event(&self, event_id: &str, user_id: &str) -> Result<(), StorageError> {
        // Appwrite has no array-union update; read, union, write back
        let event = self
            .fetch_event(event_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("event {}", event_id)))?;

        let mut joined: BTreeSet<String> = event.joined_users;
        if !joined.insert(user_id.to_string()) {
            return Ok(());
        }

        self.update_document(&self.collections.events, event_id, json!({ "joinedUsers": joined }))
            .await?;

        tracing::debug!("User {} joined event {}", user_id, event_id);

        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError> {
        self.get_document(&self.collections.users, user_id)
            .await?
            .map(|doc| parse(doc, "user"))
            .transpose()
    }

    async fn merge_user(&self, user_id: &str, patch: UserPatch) -> Result<UserProfile, StorageError> {
        let data = user_data(&patch)?;

        let doc = match self
            .update_document(&self.collections.users, user_id, data.clone())
            .await
        {
            Ok(doc) => doc,
            Err(StorageError::NotFound(_)) => {
                tracing::debug!("Creating user document for {}", user_id);
                self.create_document(&self.collections.users, user_id, data).await?
            }
            Err(e) => return Err(e),
        };

        parse(doc, "user")
    }

    async fn list_sports(&self) -> Result<Vec<Sport>, StorageError> {
        let documents = self.list_documents(&self.collections.sports, &[]).await?;
        Ok(parse_all(documents, "sport"))
    }

    async fn add_sport(&self, name: &str) -> Result<Sport, StorageError> {
        let doc = self
            .create_document(&self.collections.sports, &new_id(), json!({ "name": name }))
            .await?;
        parse(doc, "sport")
    }

    async fn delete_sport(&self, sport_id: &str) -> Result<(), StorageError> {
        self.delete_document(&self.collections.sports, sport_id).await
    }

    async fn list_cities(&self) -> Result<Vec<CityArea>, StorageError> {
        let documents = self.list_documents(&self.collections.cities, &[]).await?;
        Ok(parse_all(documents, "city"))
    }

    async fn add_city(&self, city: &str, area: &str, location: GeoPoint) -> Result<CityArea, StorageError> {
        let data = json!({
            "city": city,
            "area": area,
            "latitude": location.latitude(),
            "longitude": location.longitude(),
        });
        let doc = self.create_document(&self.collections.cities, &new_id(), data).await?;
        parse(doc, "city")
    }

    async fn delete_city(&self, city_id: &str) -> Result<(), StorageError> {
        self.delete_document(&self.collections.cities, city_id).await
    }

    async fn find_city_area(&self, city: &str, area: &str) -> Result<Option<CityArea>, StorageError> {
        let queries = vec![
            format!("equal(\"city\", [{}])", json!(city)),
            format!("equal(\"area\", [{}])", json!(area)),
        ];

        self.list_documents(&self.collections.cities, &queries)
            .await?
            .into_iter()
            .next()
            .map(|doc| parse(doc, "city"))
            .transpose()
    }
}
