use super::hub::{Audience, NotificationHub};
use super::models::{NotificationPayload, NotificationVariant};
use crate::error::NotificationError;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Background job queues whose outcomes are reported to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobQueue {
    ChampionStats,
    Compositions,
    DataCrawl,
    AccountSync,
    LeaderboardSync,
    DdragonSync,
    MetaAnalysis,
    SynergyAnalysis,
    ItemBuilds,
    DataCleanup,
    AccountRefresh,
    DailyReset,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown job queue: {0}")]
pub struct UnknownJobQueue(pub String);

impl JobQueue {
    pub const ALL: [JobQueue; 12] = [
        JobQueue::ChampionStats,
        JobQueue::Compositions,
        JobQueue::DataCrawl,
        JobQueue::AccountSync,
        JobQueue::LeaderboardSync,
        JobQueue::DdragonSync,
        JobQueue::MetaAnalysis,
        JobQueue::SynergyAnalysis,
        JobQueue::ItemBuilds,
        JobQueue::DataCleanup,
        JobQueue::AccountRefresh,
        JobQueue::DailyReset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobQueue::ChampionStats => "champion-stats",
            JobQueue::Compositions => "composition-gen",
            JobQueue::DataCrawl => "data-crawl",
            JobQueue::AccountSync => "account-sync",
            JobQueue::LeaderboardSync => "leaderboard-sync",
            JobQueue::DdragonSync => "ddragon-sync",
            JobQueue::MetaAnalysis => "meta-analysis",
            JobQueue::SynergyAnalysis => "synergy-analysis",
            JobQueue::ItemBuilds => "item-builds",
            JobQueue::DataCleanup => "data-cleanup",
            JobQueue::AccountRefresh => "account-refresh",
            JobQueue::DailyReset => "daily-reset",
        }
    }

    /// Name shown to admins in notification titles.
    pub fn label(&self) -> &'static str {
        match self {
            JobQueue::ChampionStats => "Stats Champions",
            JobQueue::Compositions => "Compositions",
            JobQueue::DataCrawl => "Crawl Données",
            JobQueue::AccountSync => "Sync Comptes",
            JobQueue::LeaderboardSync => "Sync Classement",
            JobQueue::DdragonSync => "Sync DDragon",
            JobQueue::MetaAnalysis => "Analyse Méta",
            JobQueue::SynergyAnalysis => "Analyse Synergies",
            JobQueue::ItemBuilds => "Builds Items",
            JobQueue::DataCleanup => "Nettoyage Données",
            JobQueue::AccountRefresh => "Rafraîchissement Comptes",
            JobQueue::DailyReset => "Reset Quotidien",
        }
    }
}

impl FromStr for JobQueue {
    type Err = UnknownJobQueue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobQueue::ALL
            .into_iter()
            .find(|queue| queue.as_str() == s)
            .ok_or_else(|| UnknownJobQueue(s.to_string()))
    }
}

/// Result counters checked in order; only the first positive one is shown.
const COUNT_FIELDS: [(&str, &str); 13] = [
    ("championsProcessed", "champions"),
    ("suggestionsGenerated", "suggestions"),
    ("playersCrawled", "joueurs"),
    ("matchesCollected", "matchs"),
    ("entriesSynced", "entrées"),
    ("championsUpdated", "champions"),
    ("itemsUpdated", "items"),
    ("championsAnalyzed", "champions"),
    ("synergiesComputed", "synergies"),
    ("buildsGenerated", "builds"),
    ("matchesDeleted", "matchs supprimés"),
    ("accountsRefreshed", "comptes"),
    ("usersReset", "utilisateurs"),
];

fn error_count(result: &Map<String, Value>) -> usize {
    result
        .get("errors")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// One-line summary of a job result: duration, the first non-zero counter
/// and the error count, joined by " - ".
pub fn format_result_message(result: &Map<String, Value>) -> String {
    let mut parts = Vec::new();

    if let Some(ms) = result.get("duration").and_then(Value::as_f64) {
        parts.push(format!("{:.1}s", ms / 1000.0));
    }

    let count = COUNT_FIELDS.iter().find_map(|(key, label)| match result.get(*key) {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v > 0.0) => {
            Some(format!("{n} {label}"))
        }
        _ => None,
    });
    parts.extend(count);

    let errors = error_count(result);
    if errors > 0 {
        parts.push(format!("{errors} erreur(s)"));
    }

    if parts.is_empty() {
        "Terminé".to_string()
    } else {
        parts.join(" - ")
    }
}

fn job_metadata(queue: JobQueue, job_id: Option<&str>, status: &str) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("type".into(), json!("job"));
    if let Some(job_id) = job_id {
        metadata.insert("jobId".into(), json!(job_id));
    }
    metadata.insert("queue".into(), json!(queue.as_str()));
    metadata.insert("status".into(), json!(status));
    metadata
}

fn job_payload(
    title: String,
    message: String,
    variant: NotificationVariant,
    metadata: Map<String, Value>,
) -> NotificationPayload {
    NotificationPayload {
        id: Uuid::new_v4(),
        title,
        message,
        variant,
        created_at: Utc::now(),
        metadata: Some(metadata),
    }
}

/// `success`, or `warning` when the result lists errors. Result fields are
/// merged into the metadata.
pub fn job_completed(
    queue: JobQueue,
    job_id: Option<&str>,
    result: &Map<String, Value>,
) -> NotificationPayload {
    let (variant, title) = if error_count(result) > 0 {
        (
            NotificationVariant::Warning,
            format!("{} terminé avec erreurs", queue.label()),
        )
    } else {
        (NotificationVariant::Success, format!("{} terminé", queue.label()))
    };

    let mut metadata = job_metadata(queue, job_id, "completed");
    metadata.extend(result.iter().map(|(k, v)| (k.clone(), v.clone())));

    job_payload(title, format_result_message(result), variant, metadata)
}

pub fn job_failed(queue: JobQueue, job_id: Option<&str>, error: &str) -> NotificationPayload {
    let message = if error.is_empty() {
        "Erreur inconnue".to_string()
    } else {
        error.to_string()
    };

    let mut metadata = job_metadata(queue, job_id, "failed");
    metadata.insert("error".into(), json!(error));

    job_payload(
        format!("{} échoué", queue.label()),
        message,
        NotificationVariant::Error,
        metadata,
    )
}

/// Outcome reported by a worker process.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobEvent {
    Completed {
        queue: String,
        #[serde(default, rename = "jobId")]
        job_id: Option<String>,
        #[serde(default)]
        result: Map<String, Value>,
    },
    Failed {
        queue: String,
        #[serde(default, rename = "jobId")]
        job_id: Option<String>,
        #[serde(default)]
        error: String,
    },
}

impl JobEvent {
    pub fn into_payload(self) -> Result<NotificationPayload, NotificationError> {
        let payload = match self {
            JobEvent::Completed {
                queue,
                job_id,
                result,
            } => job_completed(queue.parse()?, job_id.as_deref(), &result),
            JobEvent::Failed {
                queue,
                job_id,
                error,
            } => job_failed(queue.parse()?, job_id.as_deref(), &error),
        };
        Ok(payload)
    }
}

/// Turns a job outcome into an admin notification and broadcasts it.
pub fn notify_job(
    hub: &NotificationHub,
    event: JobEvent,
) -> Result<NotificationPayload, NotificationError> {
    let payload = event.into_payload().inspect_err(|err| {
        warn!("job notification skipped: {err}");
    })?;

    hub.broadcast(Audience::Admin, &payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::ClientChannel;

    fn result(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn queue_names_parse() {
        for queue in JobQueue::ALL {
            assert_eq!(queue.as_str().parse::<JobQueue>(), Ok(queue));
        }
        assert_eq!(
            "mystery".parse::<JobQueue>(),
            Err(UnknownJobQueue("mystery".into()))
        );
    }

    #[test]
    fn message_lists_duration_first_count_and_errors() {
        let message = format_result_message(&result(json!({
            "duration": 12345,
            "championsProcessed": 0,
            "playersCrawled": 42,
            "matchesCollected": 7,
            "errors": ["timeout", "429"]
        })));
        assert_eq!(message, "12.3s - 42 joueurs - 2 erreur(s)");
    }

    #[test]
    fn message_falls_back_when_nothing_to_report() {
        assert_eq!(format_result_message(&Map::new()), "Terminé");
        assert_eq!(
            format_result_message(&result(json!({"itemsUpdated": 0, "errors": []}))),
            "Terminé"
        );
        assert_eq!(
            format_result_message(&result(json!({"accountsRefreshed": "12"}))),
            "Terminé"
        );
    }

    #[test]
    fn completed_variant_depends_on_errors() {
        let clean = job_completed(
            JobQueue::MetaAnalysis,
            Some("job-1"),
            &result(json!({"championsAnalyzed": 160})),
        );
        assert_eq!(clean.variant, NotificationVariant::Success);
        assert_eq!(clean.title, "Analyse Méta terminé");
        assert_eq!(clean.message, "160 champions");

        let partial = job_completed(
            JobQueue::DataCrawl,
            None,
            &result(json!({"errors": ["rate limited"]})),
        );
        assert_eq!(partial.variant, NotificationVariant::Warning);
        assert_eq!(partial.title, "Crawl Données terminé avec erreurs");
        assert_eq!(partial.message, "1 erreur(s)");
    }

    #[test]
    fn completed_metadata_carries_job_and_result() {
        let payload = job_completed(
            JobQueue::ItemBuilds,
            Some("42"),
            &result(json!({"buildsGenerated": 9, "duration": 800})),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["metadata"]["type"], "job");
        assert_eq!(json["metadata"]["jobId"], "42");
        assert_eq!(json["metadata"]["queue"], "item-builds");
        assert_eq!(json["metadata"]["status"], "completed");
        assert_eq!(json["metadata"]["buildsGenerated"], 9);

        let anonymous = job_completed(JobQueue::ItemBuilds, None, &Map::new());
        assert!(!anonymous.metadata.unwrap().contains_key("jobId"));
    }

    #[test]
    fn failed_job_uses_error_variant() {
        let payload = job_failed(JobQueue::DailyReset, Some("7"), "connection refused");
        assert_eq!(payload.variant, NotificationVariant::Error);
        assert_eq!(payload.title, "Reset Quotidien échoué");
        assert_eq!(payload.message, "connection refused");
        let metadata = payload.metadata.unwrap();
        assert_eq!(metadata["status"], "failed");
        assert_eq!(metadata["error"], "connection refused");

        let unknown = job_failed(JobQueue::DailyReset, None, "");
        assert_eq!(unknown.message, "Erreur inconnue");
    }

    #[test]
    fn notify_job_reaches_admins_only() {
        let hub = NotificationHub::new();
        let (admin, mut admin_rx) = ClientChannel::stream();
        let (general, mut general_rx) = ClientChannel::stream();
        hub.register(Audience::Admin, Uuid::new_v4(), admin);
        hub.register(Audience::General, Uuid::new_v4(), general);

        let event: JobEvent = serde_json::from_value(json!({
            "status": "failed",
            "queue": "account-refresh",
            "jobId": "abc",
            "error": "boom"
        }))
        .unwrap();
        let payload = notify_job(&hub, event).unwrap();

        let frame: NotificationPayload = serde_json::from_str(&admin_rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame, payload);
        assert!(general_rx.try_recv().is_err());
    }

    #[test]
    fn unknown_queue_is_not_broadcast() {
        let hub = NotificationHub::new();
        let (admin, mut admin_rx) = ClientChannel::stream();
        hub.register(Audience::Admin, Uuid::new_v4(), admin);

        let event = JobEvent::Completed {
            queue: "mystery".into(),
            job_id: None,
            result: Map::new(),
        };
        assert!(matches!(
            notify_job(&hub, event),
            Err(NotificationError::InvalidPayload(_))
        ));
        assert!(admin_rx.try_recv().is_err());
    }
}
