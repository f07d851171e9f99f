use std::time::{SystemTime, UNIX_EPOCH};

/// The request fields covered by a Hawk MAC.
///
/// Artifacts are assembled once per signing operation.  A client keeps the artifacts of a
/// request in order to validate the server's `Server-Authorization` header later.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    /// Request timestamp; only whole seconds are significant
    pub ts: SystemTime,
    pub nonce: String,
    pub method: String,
    /// Path and query of the request
    pub resource: String,
    pub host: String,
    pub port: u16,
    /// Payload hash, as raw digest bytes
    pub hash: Option<Vec<u8>>,
    pub ext: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
}

impl Artifacts {
    /// Create artifacts with no optional fields set.
    pub fn new<S1, S2, S3, S4>(
        ts: SystemTime,
        nonce: S1,
        method: S2,
        resource: S3,
        host: S4,
        port: u16,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        Artifacts {
            ts,
            nonce: nonce.into(),
            method: method.into(),
            resource: resource.into(),
            host: host.into(),
            port,
            hash: None,
            ext: None,
            app: None,
            dlg: None,
        }
    }

    /// Set the payload hash
    pub fn hash<H: Into<Option<Vec<u8>>>>(mut self, hash: H) -> Self {
        self.hash = hash.into();
        self
    }

    /// Set the `ext` Hawk property
    pub fn ext<S: Into<String>>(mut self, ext: Option<S>) -> Self {
        self.ext = ext.map(Into::into);
        self
    }

    /// Set the `app` Hawk property
    pub fn app<S: Into<String>>(mut self, app: Option<S>) -> Self {
        self.app = app.map(Into::into);
        self
    }

    /// Set the `dlg` Hawk property
    pub fn dlg<S: Into<String>>(mut self, dlg: Option<S>) -> Self {
        self.dlg = dlg.map(Into::into);
        self
    }

    /// The timestamp as whole seconds since the epoch.
    pub fn ts_secs(&self) -> u64 {
        unix_secs(self.ts)
    }
}

pub(crate) fn unix_secs(ts: SystemTime) -> u64 {
    ts.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builder() {
        let artifacts = Artifacts::new(
            UNIX_EPOCH + Duration::new(1000, 100),
            "nonny",
            "GET",
            "/foo",
            "example.com",
            443,
        )
        .hash(vec![0u8])
        .ext(Some("ext"))
        .app(Some("app"))
        .dlg(Some("dlg"));

        assert_eq!(artifacts.ts_secs(), 1000);
        assert_eq!(artifacts.nonce, "nonny");
        assert_eq!(artifacts.method, "GET");
        assert_eq!(artifacts.resource, "/foo");
        assert_eq!(artifacts.host, "example.com");
        assert_eq!(artifacts.port, 443);
        assert_eq!(artifacts.hash, Some(vec![0u8]));
        assert_eq!(artifacts.ext, Some("ext".to_string()));
        assert_eq!(artifacts.app, Some("app".to_string()));
        assert_eq!(artifacts.dlg, Some("dlg".to_string()));
    }

    #[test]
    fn test_builder_clone() {
        let base = Artifacts::new(UNIX_EPOCH, "n", "GET", "/foo", "example.com", 80);
        let other = base.clone().ext(Some("x"));
        assert_eq!(base.ext, None);
        assert_eq!(other.ext, Some("x".to_string()));
    }

    #[test]
    fn test_ts_before_epoch() {
        let artifacts = Artifacts::new(
            UNIX_EPOCH - Duration::new(10, 0),
            "n",
            "GET",
            "/",
            "h",
            80,
        );
        assert_eq!(artifacts.ts_secs(), 0);
    }
}
