use serde_json::{json, Map, Value};
use snpm_dep_spec::PackageName;
use snpm_registry::RegistryClient;

/// A `mockito`-backed stand-in for an npm-compatible registry, for tests that
/// need [`RegistryClient`] to resolve real-looking package metadata without a
/// network round trip.
pub struct MockRegistry {
    server: mockito::ServerGuard,
}

impl MockRegistry {
    pub async fn start() -> Self {
        MockRegistry { server: mockito::Server::new_async().await }
    }

    pub fn client(&self) -> RegistryClient {
        RegistryClient::new(self.server.url())
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Register one published version of `name`, served as the package's
    /// full info document on its first request. Calling this again for the
    /// same `name` replaces the mocked response (mockito matches by path, so
    /// only the latest registration for a given name takes effect).
    pub async fn publish(&mut self, name: &str, version: &str, tarball: &[u8]) {
        let package_name = PackageName::parse(name).expect("valid package name");
        let path = registry_path(&package_name);
        let tarball_url = format!("{}/{}.tgz", self.server.url(), version);

        let body = json!({
            "name": name,
            "dist-tags": { "latest": version },
            "versions": {
                version: {
                    "name": name,
                    "version": version,
                    "dist": { "tarball": tarball_url },
                },
            },
        });

        self.server.mock("GET", path.as_str()).with_status(200).with_body(body.to_string()).create_async().await;
        self.server
            .mock("GET", format!("/{version}.tgz").as_str())
            .with_status(200)
            .with_body(tarball.to_vec())
            .create_async()
            .await;
    }

    /// Register multiple published versions of `name` in one info document,
    /// with `dist-tags.latest` pointing at the highest of them.
    pub async fn publish_versions(&mut self, name: &str, versions: &[&str]) {
        let package_name = PackageName::parse(name).expect("valid package name");
        let path = registry_path(&package_name);
        let latest = versions.iter().max().copied().unwrap_or_default();

        let mut entries = Map::new();
        for version in versions {
            let tarball_url = format!("{}/{version}.tgz", self.server.url());
            entries.insert(
                version.to_string(),
                json!({ "name": name, "version": version, "dist": { "tarball": tarball_url } }),
            );
        }

        let body = json!({
            "name": name,
            "dist-tags": { "latest": latest },
            "versions": Value::Object(entries),
        });

        self.server.mock("GET", path.as_str()).with_status(200).with_body(body.to_string()).create_async().await;
    }
}

fn registry_path(name: &PackageName) -> String {
    match &name.scope {
        Some(scope) => format!("/@{scope}%2f{}", name.bare),
        None => format!("/{}", name.bare),
    }
}
