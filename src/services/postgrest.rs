use crate::models::{
    FounderMatch, FounderProfile, FounderProfileWithUser, Industry, MatchStatus, ProfileFields,
    Skill, StartupStage, UserSummary, WorkStyle,
};
use crate::services::repository::{FounderRepository, MatchQuery, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

/// Hosted backend REST client
///
/// Talks to the PostgREST interface of the hosted database:
/// - Reading reference lists
/// - Reading and writing founder profiles
/// - Creating, listing and updating match records
pub struct PostgrestClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: PostgrestTables,
}

/// Table and view names on the hosted backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgrestTables {
    pub founder_profiles: String,
    pub founder_profiles_with_users: String,
    pub founder_matches: String,
    pub skills: String,
    pub industries: String,
    pub work_styles: String,
}

impl Default for PostgrestTables {
    fn default() -> Self {
        Self {
            founder_profiles: "founder_profiles".to_string(),
            founder_profiles_with_users: "founder_profiles_with_users".to_string(),
            founder_matches: "founder_matches".to_string(),
            skills: "skills".to_string(),
            industries: "industries".to_string(),
            work_styles: "work_styles".to_string(),
        }
    }
}

impl PostgrestClient {
    /// Create a new client for the backend at `base_url`
    pub fn new(
        base_url: String,
        api_key: String,
        timeout_secs: u64,
        tables: PostgrestTables,
    ) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> String {
        let url = format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table);
        if params.is_empty() {
            return url;
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", url, query)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T, RepositoryError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Backend call failed ({}): {} - {}", what, status, body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepositoryError::Unauthorized,
                StatusCode::CONFLICT => RepositoryError::Conflict(body),
                StatusCode::NOT_FOUND => RepositoryError::NotFound(what.to_string()),
                _ => RepositoryError::ApiError(format!("Failed to {}: {}", what, status)),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RepositoryError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<T>, RepositoryError> {
        let url = self.table_url(table, params);
        tracing::debug!("Fetching {} from: {}", what, url);
        self.execute(self.client.get(&url), what).await
    }

    /// POST/PATCH with `return=representation`, expecting exactly one row back
    async fn write_one<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        payload: &Value,
        what: &str,
    ) -> Result<T, RepositoryError> {
        let builder = builder
            .header("Prefer", "return=representation")
            .json(payload);
        let rows: Vec<T> = self.execute(builder, what).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::NotFound(what.to_string()))
    }

    async fn list_reference<T>(&self, table: &str, what: &str) -> Result<Vec<T>, RepositoryError>
    where
        T: From<ReferenceRow>,
    {
        let rows: Vec<ReferenceRow> = self
            .select(table, &[("select", "id,name".to_string()), ("order", "name.asc".to_string())], what)
            .await?;
        Ok(rows.into_iter().map(T::from).collect())
    }

    async fn first_profile(
        &self,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<Option<FounderProfile>, RepositoryError> {
        let rows: Vec<FounderProfileRow> = self.select(&self.tables.founder_profiles, params, what).await?;
        rows.into_iter().next().map(FounderProfileRow::into_profile).transpose()
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn profile_payload(fields: &ProfileFields) -> Value {
    json!({
        "skills": fields.skills,
        "industries": fields.industries,
        "startup_stage": fields.startup_stage,
        "work_style": fields.work_style,
        "goals": fields.goals,
        "experience": fields.experience,
        "seeking": fields.seeking,
    })
}

fn match_params(query: &MatchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];
    if let Some(id) = &query.founder_id {
        params.push(("founder_id", eq(id)));
    }
    if let Some(id) = &query.matched_founder_id {
        params.push(("matched_founder_id", eq(id)));
    }
    if let Some(id) = &query.participant {
        params.push((
            "or",
            format!("(founder_id.eq.\"{0}\",matched_founder_id.eq.\"{0}\")", id),
        ));
    }
    if let Some(status) = query.status {
        params.push(("status", eq(status.as_str())));
    }
    params.push(("order", "created_at.asc".to_string()));
    params
}

#[async_trait]
impl FounderRepository for PostgrestClient {
    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError> {
        self.list_reference(&self.tables.skills, "list skills").await
    }

    async fn list_industries(&self) -> Result<Vec<Industry>, RepositoryError> {
        self.list_reference(&self.tables.industries, "list industries").await
    }

    async fn list_work_styles(&self) -> Result<Vec<WorkStyle>, RepositoryError> {
        self.list_reference(&self.tables.work_styles, "list work styles").await
    }

    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<FounderProfile>, RepositoryError> {
        self.first_profile(
            &[("select", "*".to_string()), ("user_id", eq(user_id)), ("limit", "1".to_string())],
            "fetch founder profile",
        )
        .await
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Option<FounderProfile>, RepositoryError> {
        self.first_profile(
            &[("select", "*".to_string()), ("id", eq(profile_id)), ("limit", "1".to_string())],
            "fetch founder profile",
        )
        .await
    }

    async fn get_profile_with_user(
        &self,
        profile_id: &str,
    ) -> Result<Option<FounderProfileWithUser>, RepositoryError> {
        let rows: Vec<FounderProfileRow> = self
            .select(
                &self.tables.founder_profiles_with_users,
                &[("select", "*".to_string()), ("id", eq(profile_id)), ("limit", "1".to_string())],
                "fetch founder profile with user",
            )
            .await?;
        rows.into_iter()
            .next()
            .map(FounderProfileRow::into_profile_with_user)
            .transpose()
    }

    async fn insert_profile(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<FounderProfile, RepositoryError> {
        let mut payload = profile_payload(fields);
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("user_id".to_string(), Value::String(user_id.to_string()));
        }

        let url = self.table_url(&self.tables.founder_profiles, &[]);
        let row: FounderProfileRow = self
            .write_one(self.client.post(&url), &payload, "create founder profile")
            .await?;

        tracing::debug!("Created founder profile {} for user {}", row.id, user_id);
        row.into_profile()
    }

    async fn update_profile(
        &self,
        profile_id: &str,
        fields: &ProfileFields,
    ) -> Result<FounderProfile, RepositoryError> {
        let mut payload = profile_payload(fields);
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("updated_at".to_string(), json!(Utc::now()));
        }

        let url = self.table_url(&self.tables.founder_profiles, &[("id", eq(profile_id))]);
        let row: FounderProfileRow = self
            .write_one(self.client.patch(&url), &payload, "update founder profile")
            .await?;
        row.into_profile()
    }

    async fn list_candidates(
        &self,
        exclude_user_id: &str,
    ) -> Result<Vec<FounderProfileWithUser>, RepositoryError> {
        let rows: Vec<FounderProfileRow> = self
            .select(
                &self.tables.founder_profiles_with_users,
                &[("select", "*".to_string()), ("user_id", format!("neq.{}", exclude_user_id))],
                "list candidates",
            )
            .await?;

        let total = rows.len();
        let candidates: Vec<FounderProfileWithUser> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match row.into_profile_with_user() {
                    Ok(candidate) => Some(candidate),
                    Err(e) => {
                        tracing::warn!("Skipping malformed founder profile {}: {}", id, e);
                        None
                    }
                }
            })
            .filter(|c| c.profile.user_id != exclude_user_id)
            .collect();

        tracing::debug!("Queried {} candidates (rows: {})", candidates.len(), total);

        Ok(candidates)
    }

    async fn list_existing_match_targets(
        &self,
        founder_profile_id: &str,
    ) -> Result<HashSet<String>, RepositoryError> {
        #[derive(Deserialize)]
        struct TargetRow {
            #[serde(deserialize_with = "deserialize_id")]
            matched_founder_id: String,
        }

        let rows: Vec<TargetRow> = self
            .select(
                &self.tables.founder_matches,
                &[
                    ("select", "matched_founder_id".to_string()),
                    ("founder_id", eq(founder_profile_id)),
                ],
                "list existing matches",
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.matched_founder_id).collect())
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<FounderMatch>, RepositoryError> {
        let rows: Vec<MatchRow> = self
            .select(
                &self.tables.founder_matches,
                &[("select", "*".to_string()), ("id", eq(match_id)), ("limit", "1".to_string())],
                "fetch match",
            )
            .await?;
        rows.into_iter().next().map(MatchRow::into_match).transpose()
    }

    async fn list_matches(&self, query: &MatchQuery) -> Result<Vec<FounderMatch>, RepositoryError> {
        let rows: Vec<MatchRow> = self
            .select(&self.tables.founder_matches, &match_params(query), "list matches")
            .await?;
        rows.into_iter().map(MatchRow::into_match).collect()
    }

    async fn insert_match(
        &self,
        founder_id: &str,
        matched_founder_id: &str,
    ) -> Result<FounderMatch, RepositoryError> {
        let payload = json!({
            "founder_id": founder_id,
            "matched_founder_id": matched_founder_id,
            "status": MatchStatus::Pending,
        });

        let url = self.table_url(&self.tables.founder_matches, &[]);
        let row: MatchRow = self
            .write_one(self.client.post(&url), &payload, "create match")
            .await?;

        tracing::debug!("Created match: {} -> {}", founder_id, matched_founder_id);
        row.into_match()
    }

    async fn set_match_status(
        &self,
        match_id: &str,
        status: MatchStatus,
    ) -> Result<FounderMatch, RepositoryError> {
        let payload = json!({
            "status": status,
            "updated_at": Utc::now(),
        });

        let url = self.table_url(&self.tables.founder_matches, &[("id", eq(match_id))]);
        let row: MatchRow = self
            .write_one(self.client.patch(&url), &payload, "update match status")
            .await?;
        row.into_match()
    }
}

// Row DTOs. Everything coming back from the backend is decoded into these
// and checked before a domain value is built.

/// Accept string or numeric primary keys
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    name: String,
}

impl From<ReferenceRow> for Skill {
    fn from(row: ReferenceRow) -> Self {
        Skill { id: row.id, name: row.name }
    }
}

impl From<ReferenceRow> for Industry {
    fn from(row: ReferenceRow) -> Self {
        Industry { id: row.id, name: row.name }
    }
}

impl From<ReferenceRow> for WorkStyle {
    fn from(row: ReferenceRow) -> Self {
        WorkStyle { id: row.id, name: row.name }
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FounderProfileRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(deserialize_with = "deserialize_id")]
    user_id: String,
    #[serde(default)]
    skills: Vec<ReferenceRow>,
    #[serde(default)]
    industries: Vec<ReferenceRow>,
    startup_stage: String,
    #[serde(default)]
    work_style: Vec<ReferenceRow>,
    #[serde(default)]
    goals: Option<String>,
    #[serde(default)]
    experience: Option<String>,
    #[serde(default)]
    seeking: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Views either embed the owner as `user` or flatten its columns
    #[serde(default)]
    user: Option<UserRow>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl FounderProfileRow {
    fn into_profile(self) -> Result<FounderProfile, RepositoryError> {
        self.split().map(|(profile, _)| profile)
    }

    fn into_profile_with_user(self) -> Result<FounderProfileWithUser, RepositoryError> {
        let (profile, user) = self.split()?;
        Ok(FounderProfileWithUser { profile, user })
    }

    fn split(self) -> Result<(FounderProfile, UserSummary), RepositoryError> {
        let startup_stage = self
            .startup_stage
            .parse::<StartupStage>()
            .map_err(|e| RepositoryError::InvalidResponse(format!("profile {}: {}", self.id, e)))?;

        let user = match self.user {
            Some(row) => UserSummary {
                id: row.id,
                full_name: row.full_name.unwrap_or_default(),
                bio: row.bio.unwrap_or_default(),
                avatar_url: row.avatar_url,
            },
            None => UserSummary {
                id: self.user_id.clone(),
                full_name: self.full_name.unwrap_or_default(),
                bio: self.bio.unwrap_or_default(),
                avatar_url: self.avatar_url,
            },
        };

        let profile = FounderProfile {
            id: self.id,
            user_id: self.user_id,
            skills: self.skills.into_iter().map(Skill::from).collect(),
            industries: self.industries.into_iter().map(Industry::from).collect(),
            startup_stage,
            work_style: self.work_style.into_iter().map(WorkStyle::from).collect(),
            goals: self.goals.unwrap_or_default(),
            experience: self.experience.unwrap_or_default(),
            seeking: self.seeking.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        Ok((profile, user))
    }
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(deserialize_with = "deserialize_id")]
    founder_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    matched_founder_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MatchRow {
    fn into_match(self) -> Result<FounderMatch, RepositoryError> {
        let status = self
            .status
            .parse::<MatchStatus>()
            .map_err(|e| RepositoryError::InvalidResponse(format!("match {}: {}", self.id, e)))?;

        if self.founder_id == self.matched_founder_id {
            return Err(RepositoryError::InvalidResponse(format!(
                "match {} points at its own founder",
                self.id
            )));
        }

        Ok(FounderMatch {
            id: self.id,
            founder_id: self.founder_id,
            matched_founder_id: self.matched_founder_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PROFILE_ROW: &str = r#"{
        "id": "p1",
        "user_id": "u1",
        "skills": [{"id": 1, "name": "Sales"}],
        "industries": [{"id": "i1", "name": "Fintech"}],
        "startup_stage": "mvp",
        "work_style": [],
        "goals": "Ship",
        "experience": null,
        "seeking": "CTO",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z",
        "user": {"id": "u1", "full_name": "Ana", "bio": "Fintech builder"}
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> PostgrestClient {
        PostgrestClient::new(server.url(), "test_key".to_string(), 5, PostgrestTables::default())
            .unwrap()
    }

    #[test]
    fn test_table_url_encodes_params() {
        let client = PostgrestClient::new(
            "https://backend.test/".to_string(),
            "k".to_string(),
            5,
            PostgrestTables::default(),
        )
        .unwrap();

        let url = client.table_url("founder_matches", &[("or", "(a.eq.1,b.eq.1)".to_string())]);
        assert_eq!(
            url,
            "https://backend.test/rest/v1/founder_matches?or=%28a.eq.1%2Cb.eq.1%29"
        );
    }

    #[test]
    fn test_accepted_query_is_single_or_filter() {
        let params = match_params(&MatchQuery::involving("p1").with_status(MatchStatus::Accepted));
        assert!(params.contains(&(
            "or",
            "(founder_id.eq.\"p1\",matched_founder_id.eq.\"p1\")".to_string()
        )));
        assert!(params.contains(&("status", "eq.accepted".to_string())));
    }

    #[tokio::test]
    async fn test_list_skills() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/skills")
            .match_query(Matcher::UrlEncoded("order".into(), "name.asc".into()))
            .match_header("apikey", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 2, "name": "Design"}, {"id": "s1", "name": "Sales"}]"#)
            .create_async()
            .await;

        let skills = client_for(&server).list_skills().await.unwrap();

        mock.assert_async().await;
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0], Skill { id: "2".to_string(), name: "Design".to_string() });
    }

    #[tokio::test]
    async fn test_get_profile_with_user_decodes_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/founder_profiles_with_users")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.p1".into()))
            .with_status(200)
            .with_body(format!("[{}]", PROFILE_ROW))
            .create_async()
            .await;

        let candidate = client_for(&server).get_profile_with_user("p1").await.unwrap().unwrap();

        assert_eq!(candidate.profile.startup_stage, StartupStage::Mvp);
        assert_eq!(candidate.profile.skills[0].id, "1");
        assert_eq!(candidate.profile.experience, "");
        assert_eq!(candidate.user.full_name, "Ana");
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/founder_profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let profile = client_for(&server).get_profile_by_user("nobody").await.unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn test_candidates_skip_malformed_rows() {
        let mut server = mockito::Server::new_async().await;
        let bad = PROFILE_ROW.replace("\"mvp\"", "\"series-b\"").replace("\"p1\"", "\"p2\"");
        server
            .mock("GET", "/rest/v1/founder_profiles_with_users")
            .match_query(Matcher::UrlEncoded("user_id".into(), "neq.me".into()))
            .with_status(200)
            .with_body(format!("[{}, {}]", PROFILE_ROW, bad))
            .create_async()
            .await;

        let candidates = client_for(&server).list_candidates("me").await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id(), "p1");
    }

    #[tokio::test]
    async fn test_insert_match_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/founder_matches")
            .match_header("prefer", "return=representation")
            .with_status(409)
            .with_body(r#"{"code": "23505", "message": "duplicate key value"}"#)
            .create_async()
            .await;

        let result = client_for(&server).insert_match("a", "b").await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_set_match_status_unknown_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/founder_matches")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.m404".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = client_for(&server).set_match_status("m404", MatchStatus::Accepted).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_status_rejected_at_boundary() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/founder_matches")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[{"id": "m1", "founder_id": "a", "matched_founder_id": "b", "status": "maybe",
                     "created_at": "2024-03-01T10:00:00Z", "updated_at": "2024-03-01T10:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let result = client_for(&server).get_match("m1").await;
        assert!(matches!(result, Err(RepositoryError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/industries")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let result = client_for(&server).list_industries().await;
        assert!(matches!(result, Err(RepositoryError::Unauthorized)));
    }
}
