//! End-to-end pipeline runs against in-memory collaborators.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use clipflow_media::CaptionOutcome;
use clipflow_models::{ClipSpec, MediaAsset, SearchResult};
use clipflow_pipeline::acquire::Acquirer;
use clipflow_pipeline::discovery::SearchProvider;
use clipflow_pipeline::publish::Publisher;
use clipflow_pipeline::render::ClipRenderer;
use clipflow_pipeline::{
    CandidateOutcome, Pipeline, PipelineConfig, PipelineError, PipelineResult, Stage,
};

fn search_result(title: &str, views: &str, age: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={}", title),
        channel_name: "chan".to_string(),
        raw_view_text: views.to_string(),
        raw_age_text: age.to_string(),
    }
}

fn config(output_dir: PathBuf, result_count: usize, clips_per_video: usize) -> PipelineConfig {
    PipelineConfig {
        keyword: "cats".to_string(),
        result_count,
        min_views: 10_000,
        max_age_days: 700,
        output_dir,
        clips_per_video,
        clip_seconds: 15,
        font_file: None,
        publish_url: "https://publish.example.com".to_string(),
        publish_user: "user".to_string(),
        publish_pass: "pass".to_string(),
    }
}

struct StaticSearch(Vec<SearchResult>);

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _keyword: &str, limit: usize) -> PipelineResult<Vec<SearchResult>> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _keyword: &str, _limit: usize) -> PipelineResult<Vec<SearchResult>> {
        Err(PipelineError::search("results page unreachable"))
    }
}

/// Acquirer that fails for a chosen set of URLs and records every fetch.
struct FlakyAcquirer {
    fail_urls: HashSet<String>,
    fetched: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Acquirer for FlakyAcquirer {
    async fn fetch(&self, url: &str, dest: &Path) -> PipelineResult<MediaAsset> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.fail_urls.contains(url) {
            return Err(clipflow_media::MediaError::download_failed("simulated network failure").into());
        }
        Ok(MediaAsset {
            source_path: dest.to_path_buf(),
            duration_seconds: 90,
        })
    }
}

struct RecordingRenderer {
    cuts: Arc<Mutex<Vec<ClipSpec>>>,
}

#[async_trait]
impl ClipRenderer for RecordingRenderer {
    async fn cut(&self, _asset: &MediaAsset, spec: &ClipSpec, _output: &Path) -> PipelineResult<()> {
        self.cuts.lock().unwrap().push(spec.clone());
        Ok(())
    }

    async fn caption(
        &self,
        _clip: &Path,
        _caption_text: &str,
        output: &Path,
    ) -> PipelineResult<CaptionOutcome> {
        Ok(CaptionOutcome::Captioned(output.to_path_buf()))
    }
}

struct RecordingPublisher {
    published: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, path: &Path, caption: &str) -> PipelineResult<()> {
        self.published
            .lock()
            .unwrap()
            .push((path.to_path_buf(), caption.to_string()));
        Ok(())
    }
}

/// One candidate's acquisition failure must not stop later candidates from
/// reaching Published.
#[tokio::test]
async fn test_acquisition_failure_is_isolated() {
    let dir = tempfile::TempDir::new().unwrap();
    let fetched = Arc::new(Mutex::new(Vec::new()));
    let published = Arc::new(Mutex::new(Vec::new()));

    let results = vec![
        search_result("first", "2M views", "2 days ago"),
        search_result("second", "1M views", "1 week ago"),
        search_result("third", "500K views", "3 days ago"),
    ];
    let failing_url = results[1].url.clone();

    let pipeline = Pipeline::new(
        config(dir.path().to_path_buf(), 3, 2),
        StaticSearch(results),
        FlakyAcquirer {
            fail_urls: HashSet::from([failing_url]),
            fetched: fetched.clone(),
        },
        RecordingRenderer {
            cuts: Arc::new(Mutex::new(Vec::new())),
        },
        RecordingPublisher {
            published: published.clone(),
        },
    );

    let mut rng = StdRng::seed_from_u64(99);
    let report = pipeline.run(&mut rng).await.unwrap();

    assert_eq!(report.accepted, 3);
    assert_eq!(report.published_count(), 2);
    assert_eq!(report.failed_count(), 1);

    // Every candidate was attempted, in discovery order
    let fetched = fetched.lock().unwrap();
    assert_eq!(fetched.len(), 3);
    assert!(fetched[1].contains("second"));

    match &report.candidates[1].outcome {
        CandidateOutcome::Failed { stage, reason } => {
            assert_eq!(*stage, Stage::Acquire);
            assert!(reason.contains("simulated network failure"));
        }
        other => panic!("expected acquire failure, got {:?}", other),
    }

    // Two surviving candidates, two clips each
    assert_eq!(published.lock().unwrap().len(), 4);
}

/// Nine results with cycling view and age texts, run through the whole
/// pipeline: only entries clearing both thresholds are published, in
/// original order.
#[tokio::test]
async fn test_threshold_scenario_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let published = Arc::new(Mutex::new(Vec::new()));

    let views = ["5K views", "50K views", "2M views"];
    let ages = ["2 hours ago", "10 days ago", "400 days ago"];
    let results: Vec<SearchResult> = (0..9)
        .map(|i| search_result(&format!("video{}", i), views[i % 3], ages[i % 3]))
        .collect();

    let pipeline = Pipeline::new(
        config(dir.path().to_path_buf(), 9, 1),
        StaticSearch(results),
        FlakyAcquirer {
            fail_urls: HashSet::new(),
            fetched: Arc::new(Mutex::new(Vec::new())),
        },
        RecordingRenderer {
            cuts: Arc::new(Mutex::new(Vec::new())),
        },
        RecordingPublisher {
            published: published.clone(),
        },
    );

    let mut rng = StdRng::seed_from_u64(7);
    let report = pipeline.run(&mut rng).await.unwrap();

    let titles: Vec<String> = report
        .candidates
        .iter()
        .map(|r| r.candidate.title.clone())
        .collect();
    assert_eq!(
        titles,
        vec!["video1", "video2", "video4", "video5", "video7", "video8"]
    );
    assert_eq!(report.published_count(), 6);

    // Captions carry the source title
    let published = published.lock().unwrap();
    assert_eq!(published.len(), 6);
    assert_eq!(published[0].1, "video1");
}

/// Clip windows stay inside the source for every candidate.
#[tokio::test]
async fn test_rendered_specs_respect_source_duration() {
    let dir = tempfile::TempDir::new().unwrap();
    let cuts = Arc::new(Mutex::new(Vec::new()));

    let pipeline = Pipeline::new(
        config(dir.path().to_path_buf(), 1, 8),
        StaticSearch(vec![search_result("clipme", "1M views", "1 day ago")]),
        FlakyAcquirer {
            fail_urls: HashSet::new(),
            fetched: Arc::new(Mutex::new(Vec::new())),
        },
        RecordingRenderer { cuts: cuts.clone() },
        RecordingPublisher {
            published: Arc::new(Mutex::new(Vec::new())),
        },
    );

    let mut rng = StdRng::seed_from_u64(3);
    pipeline.run(&mut rng).await.unwrap();

    let cuts = cuts.lock().unwrap();
    assert_eq!(cuts.len(), 8);
    for spec in cuts.iter() {
        // Fake acquirer reports a 90-second source
        assert!(spec.end_seconds() <= 90);
        assert_eq!(spec.length_seconds, 15);
    }
}

/// Discovery failure is fatal: nothing downstream can run without results.
#[tokio::test]
async fn test_search_failure_aborts_run() {
    let dir = tempfile::TempDir::new().unwrap();

    let pipeline = Pipeline::new(
        config(dir.path().to_path_buf(), 3, 1),
        FailingSearch,
        FlakyAcquirer {
            fail_urls: HashSet::new(),
            fetched: Arc::new(Mutex::new(Vec::new())),
        },
        RecordingRenderer {
            cuts: Arc::new(Mutex::new(Vec::new())),
        },
        RecordingPublisher {
            published: Arc::new(Mutex::new(Vec::new())),
        },
    );

    let mut rng = StdRng::seed_from_u64(1);
    let err = pipeline.run(&mut rng).await.unwrap_err();
    assert!(matches!(err, PipelineError::Search(_)));
}
