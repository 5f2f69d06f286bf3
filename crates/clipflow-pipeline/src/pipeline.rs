//! Pipeline orchestration.
//!
//! Sequences Discovery → Filter → Acquire → Transform → Publish. One
//! candidate runs to completion (or failure) before the next starts, and a
//! failure in any post-filter stage is confined to its candidate: the batch
//! always continues. There are no automatic retries; a failed candidate is
//! reported and left behind.

use std::fmt;

use rand::Rng;
use tracing::{debug, info, warn};

use clipflow_media::CaptionOutcome;
use clipflow_models::{sanitize_title, Candidate, ClipArtifact};

use crate::acquire::Acquirer;
use crate::config::PipelineConfig;
use crate::discovery::SearchProvider;
use crate::error::{PipelineError, PipelineResult};
use crate::filter::filter_candidates;
use crate::publish::Publisher;
use crate::render::ClipRenderer;
use crate::selector::select_clips;

/// Post-filter stages a candidate can fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    Transform,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Acquire => "acquire",
            Stage::Transform => "transform",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Terminal state of one accepted candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    Published { artifacts: Vec<ClipArtifact> },
    Failed { stage: Stage, reason: String },
}

/// One accepted candidate with its terminal state.
#[derive(Debug)]
pub struct CandidateReport {
    pub candidate: Candidate,
    pub outcome: CandidateOutcome,
}

/// Result of a whole run.
#[derive(Debug)]
pub struct RunReport {
    /// Raw results returned by discovery
    pub searched: usize,
    /// Candidates that passed filtering
    pub accepted: usize,
    pub candidates: Vec<CandidateReport>,
}

impl RunReport {
    pub fn published_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|r| matches!(r.outcome, CandidateOutcome::Published { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.candidates.len() - self.published_count()
    }

    /// True when filtering accepted nothing and the run ended early.
    pub fn no_candidates(&self) -> bool {
        self.accepted == 0
    }
}

/// The orchestrator. Collaborators are injected so tests can run the whole
/// state machine without network access or media tools.
pub struct Pipeline<S, A, R, P> {
    config: PipelineConfig,
    search: S,
    acquirer: A,
    renderer: R,
    publisher: P,
}

impl<S, A, R, P> Pipeline<S, A, R, P>
where
    S: SearchProvider,
    A: Acquirer,
    R: ClipRenderer,
    P: Publisher,
{
    pub fn new(config: PipelineConfig, search: S, acquirer: A, renderer: R, publisher: P) -> Self {
        Self {
            config,
            search,
            acquirer,
            renderer,
            publisher,
        }
    }

    /// Run the batch to completion.
    ///
    /// Only discovery and setup errors abort the run; everything after
    /// filtering is isolated per candidate.
    pub async fn run<G: Rng>(&self, rng: &mut G) -> PipelineResult<RunReport> {
        let raw = self
            .search
            .search(&self.config.keyword, self.config.search_limit())
            .await?;
        info!(
            keyword = %self.config.keyword,
            results = raw.len(),
            "Discovery complete"
        );

        let candidates = filter_candidates(
            &raw,
            self.config.min_views,
            self.config.max_age_days,
            self.config.result_count,
        );

        if candidates.is_empty() {
            info!("No suitable candidates after filtering");
            return Ok(RunReport {
                searched: raw.len(),
                accepted: 0,
                candidates: Vec::new(),
            });
        }

        info!(accepted = candidates.len(), "Filtering complete");
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let mut reports = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let outcome = match self.process_candidate(&candidate, rng).await {
                Ok(artifacts) => {
                    info!(
                        title = %candidate.title,
                        clips = artifacts.len(),
                        "Candidate published"
                    );
                    CandidateOutcome::Published { artifacts }
                }
                Err((stage, e)) => {
                    warn!(
                        title = %candidate.title,
                        stage = %stage,
                        error = %e,
                        "Candidate failed"
                    );
                    CandidateOutcome::Failed {
                        stage,
                        reason: e.to_string(),
                    }
                }
            };
            reports.push(CandidateReport {
                candidate,
                outcome,
            });
        }

        let report = RunReport {
            searched: raw.len(),
            accepted: reports.len(),
            candidates: reports,
        };
        info!(
            published = report.published_count(),
            failed = report.failed_count(),
            "Run complete"
        );
        Ok(report)
    }

    /// Drive one candidate through Acquire → Transform → Publish.
    async fn process_candidate<G: Rng>(
        &self,
        candidate: &Candidate,
        rng: &mut G,
    ) -> Result<Vec<ClipArtifact>, (Stage, PipelineError)> {
        let stem = sanitize_title(&candidate.title);
        let source_path = self.config.output_dir.join(format!("{}.mp4", stem));

        let asset = self
            .acquirer
            .fetch(&candidate.url, &source_path)
            .await
            .map_err(|e| (Stage::Acquire, e))?;

        let caption_text = candidate.title.clone();
        let specs = select_clips(
            asset.duration_seconds,
            self.config.clips_per_video,
            self.config.clip_seconds,
            rng,
            |_| caption_text.clone(),
        );

        let mut artifacts = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let n = index + 1;

            let clip_path = self
                .config
                .output_dir
                .join(format!("{}_reel{}.mp4", stem, n));
            self.renderer
                .cut(&asset, spec, &clip_path)
                .await
                .map_err(|e| (Stage::Transform, e))?;

            let caption_path = self
                .config
                .output_dir
                .join(format!("{}_reel{}_caption.mp4", stem, n));
            let outcome = self
                .renderer
                .caption(&clip_path, &spec.caption_text, &caption_path)
                .await
                .map_err(|e| (Stage::Transform, e))?;

            match &outcome {
                CaptionOutcome::Captioned(path) => {
                    debug!(clip = %path.display(), "Clip captioned");
                }
                CaptionOutcome::Uncaptioned { path, reason } => {
                    warn!(
                        clip = %path.display(),
                        reason = %reason,
                        "Publishing without caption overlay"
                    );
                }
            }

            let final_path = outcome.path().to_path_buf();
            self.publisher
                .publish(&final_path, &spec.caption_text)
                .await
                .map_err(|e| (Stage::Publish, e))?;

            artifacts.push(ClipArtifact {
                path: final_path,
                source_candidate: candidate.clone(),
                spec: spec.clone(),
            });
        }

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use clipflow_media::CaptionOutcome;
    use clipflow_models::{MediaAsset, SearchResult};

    use crate::acquire::MockAcquirer;
    use crate::discovery::MockSearchProvider;
    use crate::publish::MockPublisher;
    use crate::render::MockClipRenderer;

    fn test_config(output_dir: PathBuf) -> PipelineConfig {
        PipelineConfig {
            keyword: "cats".to_string(),
            result_count: 3,
            min_views: 10_000,
            max_age_days: 700,
            output_dir,
            clips_per_video: 1,
            clip_seconds: 15,
            font_file: None,
            publish_url: "https://publish.example.com".to_string(),
            publish_user: "user".to_string(),
            publish_pass: "pass".to_string(),
        }
    }

    fn result(title: &str, views: &str, age: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: format!("https://www.youtube.com/watch?v={}", title),
            channel_name: "chan".to_string(),
            raw_view_text: views.to_string(),
            raw_age_text: age.to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_suitable_candidates_skips_acquisition() {
        let dir = tempfile::TempDir::new().unwrap();

        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| {
            Ok(vec![
                result("tiny", "12 views", "1 day ago"),
                result("ancient", "5M views", "4 years ago"),
            ])
        });

        // No expectations: any acquire/render/publish call panics the test.
        let acquirer = MockAcquirer::new();
        let renderer = MockClipRenderer::new();
        let publisher = MockPublisher::new();

        let pipeline = Pipeline::new(
            test_config(dir.path().to_path_buf()),
            search,
            acquirer,
            renderer,
            publisher,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let report = pipeline.run(&mut rng).await.unwrap();

        assert!(report.no_candidates());
        assert_eq!(report.searched, 2);
        assert!(report.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_caption_degradation_still_publishes() {
        let dir = tempfile::TempDir::new().unwrap();

        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Ok(vec![result("good cat", "2M views", "2 days ago")]));

        let mut acquirer = MockAcquirer::new();
        acquirer.expect_fetch().returning(|_, dest| {
            Ok(MediaAsset {
                source_path: dest.to_path_buf(),
                duration_seconds: 120,
            })
        });

        let mut renderer = MockClipRenderer::new();
        renderer.expect_cut().returning(|_, _, _| Ok(()));
        // The caption layer fails on every call; the stage degrades
        renderer.expect_caption().returning(|_, _, output| {
            Ok(CaptionOutcome::Uncaptioned {
                path: output.to_path_buf(),
                reason: "no usable caption font found".to_string(),
            })
        });

        let mut publisher = MockPublisher::new();
        publisher.expect_publish().times(1).returning(|_, _| Ok(()));

        let pipeline = Pipeline::new(
            test_config(dir.path().to_path_buf()),
            search,
            acquirer,
            renderer,
            publisher,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let report = pipeline.run(&mut rng).await.unwrap();

        assert_eq!(report.published_count(), 1);
        let artifacts = match &report.candidates[0].outcome {
            CandidateOutcome::Published { artifacts } => artifacts,
            other => panic!("expected published, got {:?}", other),
        };
        // The fallback artifact still lands at the caption output path
        assert!(artifacts[0]
            .path
            .to_string_lossy()
            .ends_with("good_cat_reel1_caption.mp4"));
    }

    #[tokio::test]
    async fn test_publish_failure_marks_stage() {
        let dir = tempfile::TempDir::new().unwrap();

        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Ok(vec![result("good cat", "2M views", "2 days ago")]));

        let mut acquirer = MockAcquirer::new();
        acquirer.expect_fetch().returning(|_, dest| {
            Ok(MediaAsset {
                source_path: dest.to_path_buf(),
                duration_seconds: 120,
            })
        });

        let mut renderer = MockClipRenderer::new();
        renderer.expect_cut().returning(|_, _, _| Ok(()));
        renderer
            .expect_caption()
            .returning(|_, _, output| Ok(CaptionOutcome::Captioned(output.to_path_buf())));

        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .returning(|_, _| Err(PipelineError::publish("upload rejected: 403")));

        let pipeline = Pipeline::new(
            test_config(dir.path().to_path_buf()),
            search,
            acquirer,
            renderer,
            publisher,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let report = pipeline.run(&mut rng).await.unwrap();

        assert_eq!(report.published_count(), 0);
        match &report.candidates[0].outcome {
            CandidateOutcome::Failed { stage, reason } => {
                assert_eq!(*stage, Stage::Publish);
                assert!(reason.contains("upload rejected"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
