use crate::{
    config::{Config, Header},
    model::{
        Created, Hut, LeaderboardEntry, NewHut, NewShot, NewZone, Shot, SightingSession, Token,
        WindRecord, Zone,
    },
    utils::{macros::api, ApiError, Result},
};
use json::json;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::fmt::{Debug, Formatter};
use tracing::{debug, info, instrument, warn};

pub struct Client {
    api: String,
    skip: Header,
    token: Option<String>,
    inner: reqwest::Client,
}

impl Debug for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Client {{ api: {}, authorized: {}, client: reqwest::Client }}",
            self.api,
            self.token.is_some()
        )
    }
}

impl Client {
    pub fn new(config: &Config, inner: reqwest::Client) -> Self {
        Self {
            api: config.api_url.clone(),
            skip: config.ngrok_skip_header.clone(),
            token: None,
            inner,
        }
    }

    /// Same endpoint and connection pool, different bearer token.
    #[must_use]
    pub fn authorized(&self, token: Option<String>) -> Self {
        Self {
            api: self.api.clone(),
            skip: self.skip.clone(),
            token,
            inner: self.inner.clone(),
        }
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let skip = matches!(method, Method::GET | Method::DELETE);
        let mut builder = self.inner.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if skip {
            builder = builder.header(self.skip.name.as_str(), self.skip.value.as_str());
        }
        builder
    }

    async fn failure(res: Response) -> ApiError {
        let status = res.status();
        let detail = res
            .json::<json::Value>()
            .await
            .ok()
            .and_then(|body| match body.get("detail")? {
                json::Value::String(detail) => Some(detail.clone()),
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());
        ApiError::Status { status, detail }
    }

    async fn checked(res: Response) -> Result<Response> {
        match res.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            status if status.is_success() => Ok(res),
            _ => Err(Self::failure(res).await.into()),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        Self::checked(builder.send().await?).await
    }

    #[instrument(skip(self), fields(api = %self.api))]
    pub async fn test_connection(&self) -> bool {
        let res = match self.send(self.request(Method::GET, api!(self.api, "test-db"))).await {
            Ok(res) => res,
            Err(error) => {
                warn!(%error, "API connection test failed");
                return false;
            }
        };
        match res.json::<json::Value>().await {
            Ok(body) => {
                info!(%body, "API connection test succeeded");
                true
            }
            Err(error) => {
                warn!(%error, "API connection test failed");
                false
            }
        }
    }

    /// Credentials go out form-encoded; a rejected login is not an expired session.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .request(Method::POST, api!(self.api, "login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::failure(res).await.into());
        }
        Ok(res.json::<Token>().await?.access_token)
    }

    pub async fn register(&self, username: &str, password: &str, code: &str) -> Result<String> {
        let res = self
            .request(Method::POST, api!(self.api, "register"))
            .json(&json!(
                {
                    "username": username,
                    "password": password,
                    "code": code,
                }
            ))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Self::failure(res).await.into());
        }
        Ok(res.json::<Token>().await?.access_token)
    }

    pub async fn huts(&self) -> Result<Vec<Hut>> {
        Ok(self
            .send(self.request(Method::GET, api!(self.api, "hutjes")))
            .await?
            .json()
            .await?)
    }

    pub async fn create_hut(&self, hut: &NewHut) -> Result<i64> {
        let created: Created = self
            .send(self.request(Method::POST, api!(self.api, "hutjes")).json(hut))
            .await?
            .json()
            .await?;
        Ok(created.id)
    }

    pub async fn update_hut(&self, hut: &Hut) -> Result<()> {
        let id = hut.id;
        self.send(self.request(Method::PUT, api!(self.api, "hutjes/{id}")).json(hut))
            .await
            .map(drop)
    }

    pub async fn delete_hut(&self, id: i64) -> Result<()> {
        self.send(self.request(Method::DELETE, api!(self.api, "hutjes/{id}")))
            .await
            .map(drop)
    }

    pub async fn zones(&self) -> Result<Vec<Zone>> {
        Ok(self
            .send(self.request(Method::GET, api!(self.api, "zones")))
            .await?
            .json()
            .await?)
    }

    pub async fn create_zone(&self, zone: &NewZone) -> Result<i64> {
        let created: Created = self
            .send(self.request(Method::POST, api!(self.api, "zones")).json(zone))
            .await?
            .json()
            .await?;
        Ok(created.id)
    }

    pub async fn update_zone(&self, id: i64, zone: &NewZone) -> Result<()> {
        self.send(self.request(Method::PUT, api!(self.api, "zones/{id}")).json(zone))
            .await
            .map(drop)
    }

    pub async fn delete_zone(&self, id: i64) -> Result<()> {
        self.send(self.request(Method::DELETE, api!(self.api, "zones/{id}")))
            .await
            .map(drop)
    }

    pub async fn shots(&self, hut_id: i64) -> Result<Vec<Shot>> {
        Ok(self
            .send(
                self.request(Method::GET, api!(self.api, "schoten"))
                    .query(&[("hut_id", hut_id)]),
            )
            .await?
            .json()
            .await?)
    }

    pub async fn create_shot(&self, shot: &NewShot) -> Result<()> {
        self.send(self.request(Method::POST, api!(self.api, "schoten")).json(shot))
            .await
            .map(drop)
    }

    pub async fn delete_shot(&self, id: i64) -> Result<()> {
        self.send(self.request(Method::DELETE, api!(self.api, "schoten/{id}")))
            .await
            .map(drop)
    }

    pub async fn report(&self, session: &SightingSession) -> Result<()> {
        self.send(self.request(Method::POST, api!(self.api, "sessies")).json(session))
            .await
            .map(drop)
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        Ok(self
            .send(self.request(Method::GET, api!(self.api, "leaderboard")))
            .await?
            .json()
            .await?)
    }

    /// `None` when the backend has no wind data right now.
    pub async fn latest_wind(&self) -> Result<Option<Vec<WindRecord>>> {
        let res = self
            .request(Method::GET, api!(self.api, "wind/latest"))
            .send()
            .await?;
        if !res.status().is_success() {
            warn!(status = %res.status(), "wind data unavailable");
            return Ok(None);
        }
        let records: Vec<WindRecord> = res.json().await?;
        debug!(records = records.len(), "wind data loaded");
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LatLng, Vertex, ZoneType};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Answers exactly one HTTP request and hands back what was received.
    async fn respond_once(status: &'static str, body: &'static str) -> (Client, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0_u8; 1024];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..n]);
                let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&received[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map_or(0, |value| value.trim().parse::<usize>().unwrap());
                if received.len() >= end + 4 + length {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });

        let config = Config {
            api_url: format!("http://{addr}"),
            ..Config::default()
        };
        (Client::new(&config, reqwest::Client::new()), handle)
    }

    #[tokio::test]
    async fn huts_carry_auth_and_skip_header() {
        let (client, server) = respond_once(
            "200 OK",
            r#"[{"id": 3, "name": "Eik", "number": 7, "desc": "bij de beek", "lat": 51.43, "lng": 7.87}]"#,
        )
        .await;
        let client = client.authorized(Some("abc".into()));

        let huts = client.huts().await.unwrap();
        assert_eq!(huts.len(), 1);
        assert_eq!(huts[0].title(), "Eik 7");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /hutjes "));
        assert!(request.contains("authorization: bearer abc"));
        assert!(request.contains("ngrok-skip-browser-warning: skip-browser-warning"));
    }

    #[tokio::test]
    async fn unauthorized_is_distinguished() {
        let (client, server) = respond_once("401 Unauthorized", r#"{"detail": "expired"}"#).await;
        let error = client.zones().await.unwrap_err();
        assert!(error.is_unauthorized());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn failed_login_is_not_a_logout() {
        let (client, server) =
            respond_once("401 Unauthorized", r#"{"detail": "Onjuiste gebruikersnaam"}"#).await;
        let error = client.login("jan", "fout").await.unwrap_err();
        assert!(!error.is_unauthorized());
        assert_eq!(error.detail(), "Onjuiste gebruikersnaam");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /login "));
        assert!(request.contains("username=jan&password=fout"));
    }

    #[tokio::test]
    async fn login_returns_token() {
        let (client, server) =
            respond_once("200 OK", r#"{"access_token": "t0k3n", "token_type": "bearer"}"#).await;
        assert_eq!(client.login("jan", "geheim").await.unwrap(), "t0k3n");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn create_zone_posts_vertex_pairs() {
        let (client, server) = respond_once("200 OK", r#"{"id": 12}"#).await;
        let zone = NewZone {
            kind: ZoneType::Grens,
            label: "noordgrens".into(),
            latlngs: vec![
                Vertex(LatLng::new(51.0, 7.0)),
                Vertex(LatLng::new(51.5, 7.5)),
            ],
        };
        assert_eq!(client.create_zone(&zone).await.unwrap(), 12);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /zones "));
        assert!(request.contains(r#""type":"grens""#));
        assert!(request.contains(r#""latlngs":[[51.0,7.0],[51.5,7.5]]"#));
    }

    #[tokio::test]
    async fn shots_are_queried_by_hut() {
        let (client, server) = respond_once(
            "200 OK",
            r#"[{"id": 1, "hut_id": 4, "soort": "ree", "geslacht": "bok", "gewicht_kg": 18.5, "shot_at": "2024-05-01T06:30:00", "gebruiker": "jan"}]"#,
        )
        .await;
        let shots = client.shots(4).await.unwrap();
        assert_eq!(shots[0].gewicht_kg, Some(18.5));
        assert!(server.await.unwrap().starts_with("GET /schoten?hut_id=4 "));
    }

    #[tokio::test]
    async fn register_failure_carries_detail() {
        let (client, server) =
            respond_once("400 Bad Request", r#"{"detail": "Ongeldige code"}"#).await;
        let error = client.register("jan", "geheim", "0000").await.unwrap_err();
        assert_eq!(error.detail(), "Ongeldige code");
        assert!(server.await.unwrap().contains(r#""code":"0000""#));
    }

    #[tokio::test]
    async fn missing_wind_is_none() {
        let (client, server) = respond_once("404 Not Found", r#"{"detail": "none"}"#).await;
        assert_eq!(client.latest_wind().await.unwrap(), None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn sighting_is_tagged_by_status() {
        let (client, server) = respond_once("200 OK", "{}").await;
        client
            .report(&SightingSession::NotSeen {
                hut_id: 9,
                timestamp: "2024-05-01T06:30:00Z".into(),
            })
            .await
            .unwrap();
        let request = server.await.unwrap();
        assert!(request.contains(r#""status":"niet-gezien""#));
        assert!(request.contains(r#""hut_id":9"#));
    }
}
