//! End-to-end fetch tests against a mocked Scholar server using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gscholar_profile::batch::{run_batch, BatchOutcome};
use gscholar_profile::export::load_publications;
use gscholar_profile::{
    FetchConfig, ProfileFetcher, ProfileId, PublicationCount, ReqwestPageSource,
    ScholarError, ScholarPageParser, Sleeper,
};

/// Records requested delays without waiting.
#[derive(Clone, Default)]
struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    fn total(&self) -> Duration {
        self.slept.lock().expect("lock").iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().expect("lock").push(duration);
    }
}

const TEST_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) gscholar-profile-test";

const PROFILE_HTML: &str = r##"<html><body>
  <div id="gsc_prf_in">Grace Hopper</div>
  <div class="gsc_prf_il">Yale University</div>
  <div class="gsc_prf_il" id="gsc_prf_int">
    <a class="gsc_prf_inta gs_ibl" href="#">Compilers</a>
    <a class="gsc_prf_inta gs_ibl" href="#">COBOL</a>
  </div>
  <table id="gsc_rsb_st"><tbody>
    <tr><td>Citations</td><td class="gsc_rsb_std">9000</td><td class="gsc_rsb_std">1200</td></tr>
    <tr><td>h-index</td><td class="gsc_rsb_std">30</td><td class="gsc_rsb_std">11</td></tr>
    <tr><td>i10-index</td><td class="gsc_rsb_std">55</td><td class="gsc_rsb_std">14</td></tr>
  </tbody></table>
</body></html>"##;

fn publication_page(start: usize, rows: usize) -> String {
    let rows: String = (start..start + rows)
        .map(|i| {
            format!(
                r#"<tr class="gsc_a_tr"><td class="gsc_a_t"><a class="gsc_a_at" href="">Paper {i}</a><div class="gs_gray">G Hopper</div><div class="gs_gray">Journal {i}</div></td><td class="gsc_a_c"><a class="gsc_a_ac gs_ibl" href="">{i}</a></td><td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">19{:02}</span></td></tr>"#,
                i % 100
            )
        })
        .collect();
    format!(r#"<html><body><table id="gsc_a_t"><tbody id="gsc_a_b">{rows}</tbody></table></body></html>"#)
}

fn test_config(server: &MockServer, page_size: usize) -> FetchConfig {
    FetchConfig {
        base_url: server.uri(),
        page_size,
        rate_limit_delay: Duration::from_secs(7),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn build_fetcher(
    config: FetchConfig,
    sleeper: RecordingSleeper,
) -> ProfileFetcher<ReqwestPageSource, ScholarPageParser, RecordingSleeper> {
    let source = ReqwestPageSource::new(&config, &[]).expect("client");
    ProfileFetcher::new(source, ScholarPageParser::default(), sleeper, config).expect("config")
}

async fn mount_profile(server: &MockServer, user: &str) {
    Mock::given(method("GET"))
        .and(path("/citations"))
        .and(query_param("user", user))
        .and(query_param_is_missing("cstart"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, user: &str, cstart: usize, page_size: usize, rows: usize) {
    Mock::given(method("GET"))
        .and(path("/citations"))
        .and(query_param("user", user))
        .and(query_param("cstart", cstart.to_string()))
        .and(query_param("pagesize", page_size.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(publication_page(cstart, rows)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_profile_over_http() {
    let server = MockServer::start().await;
    mount_profile(&server, "hopper").await;
    mount_page(&server, "hopper", 0, 3, 3).await;
    mount_page(&server, "hopper", 3, 3, 2).await;

    let fetcher = build_fetcher(test_config(&server, 3), RecordingSleeper::default());
    let profile = fetcher
        .fetch_profile(&ProfileId::new("hopper"))
        .await
        .expect("fetch");

    assert_eq!(profile.name.as_deref(), Some("Grace Hopper"));
    assert_eq!(profile.affiliation.as_deref(), Some("Yale University"));
    assert_eq!(profile.interests, vec!["Compilers", "COBOL"]);
    let metrics = profile.metrics.as_ref().expect("metrics");
    assert_eq!(metrics.citations.all_time, "9000");
    assert_eq!(metrics.i10_index.recent, "14");

    assert_eq!(profile.publication_count, PublicationCount::Counted(5));
    let titles: Vec<_> = profile.publications.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Paper 0", "Paper 1", "Paper 2", "Paper 3", "Paper 4"]);
    assert_eq!(profile.publications[4].venue, "Journal 4");
    assert_eq!(profile.publications[4].year, "1904");
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/citations"))
        .and(header("user-agent", TEST_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(publication_page(0, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = FetchConfig {
        user_agent: TEST_AGENT.to_string(),
        ..test_config(&server, 100)
    };
    let fetcher = build_fetcher(config, RecordingSleeper::default());
    let pubs = fetcher
        .fetch_publications(&ProfileId::new("x"))
        .await
        .expect("fetch");
    assert_eq!(pubs.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_then_success_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/citations"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/citations"))
        .respond_with(ResponseTemplate::new(200).set_body_string(publication_page(0, 4)))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = RecordingSleeper::default();
    let fetcher = build_fetcher(test_config(&server, 100), sleeper.clone());
    let pubs = fetcher
        .fetch_publications(&ProfileId::new("x"))
        .await
        .expect("fetch");

    assert_eq!(pubs.len(), 4);
    assert_eq!(sleeper.total(), Duration::from_secs(21));
}

#[tokio::test]
async fn test_retries_exhausted_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/citations"))
        .respond_with(ResponseTemplate::new(429))
        .expect(5)
        .mount(&server)
        .await;

    let fetcher = build_fetcher(test_config(&server, 100), RecordingSleeper::default());
    let err = fetcher
        .fetch_publications(&ProfileId::new("x"))
        .await
        .expect_err("should exhaust");
    assert!(err.is_retries_exhausted());
}

#[tokio::test]
async fn test_publication_failure_keeps_profile() {
    let server = MockServer::start().await;
    mount_profile(&server, "hopper").await;
    Mock::given(method("GET"))
        .and(path("/citations"))
        .and(query_param("cstart", "0"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = build_fetcher(test_config(&server, 100), RecordingSleeper::default());
    let profile = fetcher
        .fetch_profile(&ProfileId::new("hopper"))
        .await
        .expect("profile");

    assert_eq!(profile.name.as_deref(), Some("Grace Hopper"));
    assert!(profile.publication_count.is_failed());
    assert!(profile.publications.is_empty());
}

#[tokio::test]
async fn test_batch_writes_csv_per_profile() {
    let server = MockServer::start().await;
    mount_profile(&server, "hopper").await;
    mount_page(&server, "hopper", 0, 100, 2).await;
    Mock::given(method("GET"))
        .and(path("/citations"))
        .and(query_param("user", "gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = tempfile::TempDir::new().expect("tempdir");
    let output_dir = out.path().join("results");
    let fetcher = build_fetcher(test_config(&server, 100), RecordingSleeper::default());

    let input = format!("{}/citations?user=hopper&hl=en, gone", server.uri());
    let outcomes = run_batch(&fetcher, &input, &output_dir).await;

    assert_eq!(outcomes.len(), 2);
    let BatchOutcome::Saved { profile, path, .. } = &outcomes[0] else {
        panic!("expected saved profile, got {:?}", outcomes[0]);
    };
    assert_eq!(path, &output_dir.join("scholar_profile_hopper.csv"));
    assert_eq!(&load_publications(path).expect("read csv"), &profile.publications);

    assert!(matches!(
        &outcomes[1],
        BatchOutcome::Failed { error: ScholarError::HardFailure { status: 404, .. }, .. }
    ));
}
