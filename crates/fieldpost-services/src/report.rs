//! Report submission orchestrator.
//!
//! One `submit` call runs the whole capture pipeline: validate, classify
//! and budget the attachments, build the combined text artifact, render and
//! persist the browsable artifact and the metadata record, then notify
//! (remote mode). Per-file problems degrade to warnings on the outcome;
//! only validation, storage of the artifact/metadata, and startup
//! configuration can fail the submission outright.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};

use fieldpost_core::{
    generate_tag, host_label, AttachmentRecord, Config, ReportError, ReportMetadata, ReportMode,
    ReportResult, SubmitOutcome, SubmitRequest,
};
use fieldpost_processing::{
    classify, combine_text_files, AttachmentCandidate, EmbedBudget, COMBINED_FILENAME,
};
use fieldpost_render::html::escape_html;
use fieldpost_render::{
    render_artifact, segment, transliterate, transliterate_body, MathRenderer, Segment,
};
use fieldpost_storage::keys::{artifact_key, metadata_key, object_key};
use fieldpost_storage::{create_store, ReportStore};

use crate::notify::{content_type_for, EmailNotifier, EmbeddedFile};
use crate::search::ReportFinder;

/// The report service. Holds the backend store, the optional notifier
/// (remote mode), and the math renderer for notification bodies.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    config: Config,
    notifier: Option<EmailNotifier>,
    math: MathRenderer,
}

impl ReportService {
    /// Build the service from configuration. Remote mode without a working
    /// notifier configuration is a startup error, not a per-report one.
    pub async fn new(config: Config) -> ReportResult<Self> {
        let store = create_store(&config).await?;
        let notifier = match config.mode {
            ReportMode::Local => None,
            ReportMode::Remote => Some(EmailNotifier::from_config(&config).ok_or_else(|| {
                ReportError::Config(
                    "remote mode requires SMTP host and report email addresses".to_string(),
                )
            })?),
        };
        Ok(Self::from_parts(store, config, notifier))
    }

    /// Assemble a service from pre-built parts. Used by tests and by
    /// embedders that construct their own store.
    pub fn from_parts(
        store: Arc<dyn ReportStore>,
        config: Config,
        notifier: Option<EmailNotifier>,
    ) -> Self {
        let math = MathRenderer::new(
            config.math_render_endpoint.clone(),
            Duration::from_secs(config.math_render_timeout_secs),
        );
        ReportService {
            store,
            config,
            notifier,
            math,
        }
    }

    /// A finder sharing this service's store and search configuration.
    pub fn finder(&self) -> ReportFinder {
        ReportFinder::new(
            Arc::clone(&self.store),
            self.config.fetch_ceiling,
            self.config.max_results,
        )
    }

    /// Submit one report.
    pub async fn submit(&self, request: SubmitRequest) -> ReportResult<SubmitOutcome> {
        if request.agent_name.trim().is_empty() {
            return Err(ReportError::Validation("agent name is required".to_string()));
        }
        if request.title.trim().is_empty() {
            return Err(ReportError::Validation("title is required".to_string()));
        }
        let body = match (&request.body, &request.body_file) {
            (Some(_), Some(_)) => {
                return Err(ReportError::Validation(
                    "provide either an inline body or a body file, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(ReportError::Validation(
                    "a report body is required (inline or from a file)".to_string(),
                ))
            }
            (Some(body), None) => body.clone(),
            (None, Some(path)) => fs::read_to_string(path).await.map_err(|e| {
                ReportError::Validation(format!(
                    "cannot read body file {}: {}",
                    path.display(),
                    e
                ))
            })?,
        };

        // One timestamp per submission; every key, locator and metadata
        // field derives from it.
        let timestamp = Utc::now();
        let tag = generate_tag();
        let agent = request.agent_name.trim().to_string();
        let mut warnings = Vec::new();

        // Stat and classify the caller-supplied files.
        let mut candidates = Vec::new();
        for path in &request.files {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if filename.is_empty() {
                warnings.push(format!("skipping attachment with no filename: {}", path.display()));
                continue;
            }
            match fs::metadata(path).await {
                Ok(meta) if meta.is_file() => candidates.push(AttachmentCandidate {
                    role: classify(&filename),
                    filename,
                    path: path.clone(),
                    size_bytes: meta.len(),
                }),
                Ok(_) => {
                    warn!(path = %path.display(), "Attachment is not a regular file, skipping");
                    warnings.push(format!("skipping non-file attachment: {}", path.display()));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot stat attachment, skipping");
                    warnings.push(format!("skipping unreadable attachment {}: {}", path.display(), e));
                }
            }
        }
        let attachment_count = candidates.len();

        let budget = EmbedBudget {
            max_count: self.config.max_embed_count,
            max_total_bytes: self.config.max_embed_bytes,
        };
        let selection = budget.select(&mut candidates);

        // Persist the attachments, collecting the bytes of the embedded
        // ones for the notification.
        let mut records: Vec<AttachmentRecord> = Vec::with_capacity(candidates.len());
        let mut embedded_files = Vec::new();
        for (candidate, wants_embed) in candidates.iter().zip(&selection.embedded) {
            let data = match fs::read(&candidate.path).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %candidate.path.display(), error = %e, "Cannot read attachment, skipping");
                    warnings.push(format!(
                        "skipping unreadable attachment {}: {}",
                        candidate.path.display(),
                        e
                    ));
                    continue;
                }
            };
            let key = object_key(&agent, timestamp, &candidate.filename);
            let content_type = content_type_for(&candidate.filename);
            let locator = match self.store.persist(&key, data.clone(), content_type).await {
                Ok(locator) => locator,
                Err(e) => {
                    warn!(key = %key, error = %e, "Cannot persist attachment, skipping");
                    warnings.push(format!(
                        "skipping unuploadable attachment {}: {}",
                        candidate.filename, e
                    ));
                    continue;
                }
            };
            if *wants_embed {
                embedded_files.push(EmbeddedFile {
                    filename: candidate.filename.clone(),
                    content_type: content_type.to_string(),
                    data,
                });
            }
            records.push(AttachmentRecord {
                filename: candidate.filename.clone(),
                size_bytes: candidate.size_bytes,
                role: candidate.role,
                locator,
                embedded: *wants_embed,
            });
        }

        // Combined text artifact, persisted and linked but not counted as a
        // caller attachment.
        if let Some(combined) = combine_text_files(&candidates).await {
            let key = object_key(&agent, timestamp, COMBINED_FILENAME);
            let size = combined.len() as u64;
            match self.store.persist(&key, combined, "text/plain").await {
                Ok(locator) => records.push(AttachmentRecord {
                    filename: COMBINED_FILENAME.to_string(),
                    size_bytes: size,
                    role: fieldpost_core::FileRole::Text,
                    locator,
                    embedded: false,
                }),
                Err(e) => {
                    warn!(key = %key, error = %e, "Cannot persist combined artifact, skipping");
                    warnings.push(format!("skipping combined text artifact: {}", e));
                }
            }
        }

        // Browsable artifact, then the metadata record last so a record
        // never points at a missing artifact.
        let artifact = render_artifact(&request.title, &agent, &tag, &body);
        let artifact_locator = self
            .store
            .persist(
                &artifact_key(&agent, timestamp),
                artifact.into_bytes(),
                "text/html",
            )
            .await?;

        let metadata = ReportMetadata::new(
            tag.clone(),
            agent.clone(),
            request.title.clone(),
            timestamp,
            artifact_locator.clone(),
            host_label(),
            self.store.backend(),
        );
        self.store
            .persist(
                &metadata_key(&agent, timestamp),
                serde_json::to_vec_pretty(&metadata).map_err(ReportError::from)?,
                "application/json",
            )
            .await?;

        if let Some(notifier) = &self.notifier {
            let subject = if request.urgent {
                format!("URGENT: [{}] {}", tag, request.title)
            } else {
                format!("[{}] {}", tag, request.title)
            };
            let text_body = self.compose_text(&metadata, &body, &records);
            let html_body = self
                .compose_html(&metadata, &body, &records, timestamp)
                .await;
            if let Err(e) = notifier
                .send(&subject, &text_body, &html_body, &embedded_files, request.urgent)
                .await
            {
                warn!(error = %e, "Report notification failed");
                warnings.push(format!("notification failed: {}", e));
            }
        }

        info!(
            tag = %tag,
            agent = %agent,
            attachments = attachment_count,
            embedded = embedded_files.len(),
            mode = %self.store.backend(),
            "Report submitted"
        );

        Ok(SubmitOutcome {
            tag,
            locator: artifact_locator,
            attachment_count,
            embedded_count: embedded_files.len(),
            warnings,
        })
    }

    /// Plain-text notification body: header lines, the transliterated
    /// report body, then the attachment locators.
    fn compose_text(
        &self,
        metadata: &ReportMetadata,
        body: &str,
        records: &[AttachmentRecord],
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!("Report {} from {}\n", metadata.tag, metadata.agent_name));
        out.push_str(&format!("Title: {}\n", metadata.title));
        out.push_str(&format!("Artifact: {}\n\n", metadata.artifact_locator));
        out.push_str(&transliterate_body(body));
        if !records.is_empty() {
            out.push_str("\n\nAttachments:\n");
            for record in records {
                out.push_str(&format!("  {} — {}\n", record.filename, record.locator));
            }
        }
        out
    }

    /// HTML notification body. Math spans are resolved to hosted PNGs; a
    /// span that fails to render degrades to its Unicode transliteration.
    async fn compose_html(
        &self,
        metadata: &ReportMetadata,
        body: &str,
        records: &[AttachmentRecord],
        timestamp: chrono::DateTime<Utc>,
    ) -> String {
        let mut rendered = String::new();
        for (i, piece) in segment(body).into_iter().enumerate() {
            match piece {
                Segment::Text(text) => {
                    rendered.push_str(&escape_html(&text).replace('\n', "<br>\n"));
                }
                Segment::Math(span) => match self.math.render_png(&span.tex).await {
                    Ok(png) => {
                        let key = object_key(
                            &metadata.agent_name,
                            timestamp,
                            &format!("math-{}.png", i),
                        );
                        match self.store.persist(&key, png, "image/png").await {
                            Ok(locator) => rendered.push_str(&format!(
                                r#"<img src="{}" alt="{}">"#,
                                escape_html(&locator),
                                escape_html(&span.tex)
                            )),
                            Err(e) => {
                                warn!(error = %e, "Failed to persist rendered math, using fallback");
                                rendered.push_str(&escape_html(&transliterate(&span.tex)));
                            }
                        }
                    }
                    Err(e) => {
                        warn!(tex = %span.tex, error = %e, "Math render failed, using fallback");
                        rendered.push_str(&escape_html(&transliterate(&span.tex)));
                    }
                },
            }
        }

        let mut attachments = String::new();
        if !records.is_empty() {
            attachments.push_str("<h3>Attachments</h3><ul>");
            for record in records {
                attachments.push_str(&format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    escape_html(&record.locator),
                    escape_html(&record.filename)
                ));
            }
            attachments.push_str("</ul>");
        }

        format!(
            r#"<h2>{title}</h2>
<p>Tag <strong>{tag}</strong> · Agent {agent} · {date} {hour:02}:{minute:02} UTC</p>
<p><a href="{locator}">View the full report</a></p>
<div>{body}</div>
{attachments}"#,
            title = escape_html(&metadata.title),
            tag = escape_html(&metadata.tag),
            agent = escape_html(&metadata.agent_name),
            date = metadata.date,
            hour = metadata.hour,
            minute = metadata.minute,
            locator = escape_html(&metadata.artifact_locator),
            body = rendered,
            attachments = attachments,
        )
    }
}
