use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

use tabstrip_builder::manifest;
use tabstrip_builder::{BuildConfig, PreprocessorKind};

pub const TAG: &str = "131.0.6738.0";

/// Route that answers only after the client should have given up
const STALL_PATH: &str = "/stall";

type Routes = Arc<HashMap<String, Vec<u8>>>;

/// Local stand-in for the release dashboard and the source host
pub struct Upstream {
    pub addr: SocketAddr,
    routes: HashMap<String, Vec<u8>>,
}

impl Upstream {
    pub fn new() -> Self {
        let mut routes = HashMap::new();
        routes.insert(
            "/releases".to_string(),
            format!(
                r#"[{{"version":"130.0.6700.1","time":1700000000000,"platform":"Windows"}},
                    {{"version":"{TAG}","time":1800000000000,"platform":"Linux"}}]"#
            )
            .into_bytes(),
        );

        let tab_strip = tar_gz(&[
            ("alert_indicator.html", Some("<div class=\"indicator\"></div>\n")),
            ("alert_indicators.html", Some("<div id=\"container\"></div>\n")),
            ("tab_group.html", Some("<div id=\"chip\"></div>\n")),
            (
                "tab_list.html",
                Some("<div id=\"list\"></div>\n<if expr=\"chromeos_ash\"><div id=\"ash\"></div></if>\n"),
            ),
            (
                "tab.html",
                Some("<img src=\"chrome://theme/IDR_CRASH_SAD_FAVICON@2x\">\n<i style=\"background: url(chrome://resources/images/icon_clear.svg)\"></i>\n"),
            ),
            ("alert_indicator.ts", Some("export class AlertIndicatorElement {}\n")),
            ("alert_indicators.ts", Some("export class AlertIndicatorsElement {}\n")),
            ("tab_group.ts", Some("export class TabGroupElement {}\n")),
            (
                "tab_list.ts",
                Some("import '//resources/js/strings.m.js';\nimport {assert} from 'chrome://resources/js/assert.js';\nexport class TabListElement {}\n"),
            ),
            ("tab.ts", Some("import {getTemplate} from './tab.html.js';\n")),
            (
                "drag_manager.ts",
                Some("// <if expr=\"is_linux\">\nconst LINUX = true;\n// </if>\n"),
            ),
            ("tab_swiper.ts", Some("export class TabSwiper {}\n")),
            ("tab_strip.html", Some("<tabstrip-tab-list></tabstrip-tab-list>\n")),
            ("alert_indicators/", None),
            ("alert_indicators/tab_media_recording.svg", Some("<svg/>")),
        ]);
        routes.insert(
            format!("/src/+archive/refs/tags/{TAG}/chrome/browser/resources/tab_strip.tar.gz"),
            tab_strip,
        );
        routes.insert(
            format!("/src/+archive/refs/tags/{TAG}/tools/grit.tar.gz"),
            tar_gz(&[("preprocess_if_expr.py", Some("# unused\n"))]),
        );

        let mut upstream = Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            routes,
        };
        upstream.serve_file(manifest::UTIL_SOURCE, "export function isRTL() {}\n");
        for module in manifest::SHARED_MODULES {
            upstream.serve_file(module.repo_path, "export {};\n");
        }
        upstream
    }

    /// Serve `body` base64-encoded at the tagged `?format=TEXT` URL of `repo_path`
    pub fn serve_file(&mut self, repo_path: &str, body: &str) {
        self.routes.insert(
            format!("/src/+/refs/tags/{TAG}/{repo_path}?format=TEXT"),
            STANDARD.encode(body).into_bytes(),
        );
    }

    pub fn remove(&mut self, suffix: &str) {
        self.routes.retain(|path, _| !path.ends_with(suffix));
    }

    /// Bind to an ephemeral port and serve until the test runtime shuts down
    pub async fn start(mut self) -> Self {
        let listener = tokio::net::TcpListener::bind(self.addr).await.unwrap();
        self.addr = listener.local_addr().unwrap();

        let routes: Routes = Arc::new(self.routes.clone());
        let app = Router::new().fallback(respond).with_state(routes);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        self
    }

    pub fn releases_url(&self) -> String {
        format!("http://{}/releases", self.addr)
    }

    pub fn stalling_url(&self) -> String {
        format!("http://{}{STALL_PATH}", self.addr)
    }

    pub fn source_host(&self) -> String {
        format!("http://{}/src/", self.addr)
    }
}

async fn respond(State(routes): State<Routes>, uri: Uri) -> Result<Vec<u8>, StatusCode> {
    if uri.path() == STALL_PATH {
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    routes.get(&key).cloned().ok_or(StatusCode::NOT_FOUND)
}

/// URL on a port nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/releases")
}

fn tar_gz(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        match content {
            Some(content) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(content.len() as u64);
                header.set_cksum();
                builder.append_data(&mut header, path, content.as_bytes()).unwrap();
            }
            None => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                header.set_cksum();
                builder.append_data(&mut header, path, std::io::empty()).unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// `<tmp>/builder` work dir next to `<tmp>/src` and `<tmp>/strip`
pub struct TestEnv {
    _tmp: TempDir,
    pub work: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let work = tmp.path().join("builder");
        fs::create_dir_all(&work).unwrap();

        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        for file in manifest::SIBLING_SOURCES {
            fs::write(src.join(file), format!("// {file}\n")).unwrap();
        }

        let strip = tmp.path().join("strip");
        fs::create_dir_all(&strip).unwrap();
        fs::write(strip.join("IDR_CRASH_SAD_FAVICON@2x.png"), b"PNG").unwrap();
        fs::write(strip.join("icon_clear.svg"), "<svg/>").unwrap();

        Self { _tmp: tmp, work }
    }

    pub fn config(&self, upstream: &Upstream) -> BuildConfig {
        BuildConfig {
            releases_url: upstream.releases_url(),
            source_host: upstream.source_host(),
            work_dir: self.work.clone(),
            preprocessor: PreprocessorKind::Native,
            ..BuildConfig::default()
        }
    }

    pub fn out(&self, name: &str) -> String {
        fs::read_to_string(self.work.join("out").join(name))
            .unwrap_or_else(|e| panic!("out/{name}: {e}"))
    }

    /// Path under `out/` → bytes, for whole-tree comparisons
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let out = self.work.join("out");
        walkdir::WalkDir::new(&out)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(&out).unwrap();
                (rel.to_string_lossy().into_owned(), fs::read(e.path()).unwrap())
            })
            .collect()
    }
}
