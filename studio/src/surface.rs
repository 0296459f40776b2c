use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    #[default]
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub body: Option<String>,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
            severity: Severity::Info,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::info(title)
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Route {
    Landing,
    Runtime,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Runtime => "/try",
        }
    }
}

/// The presentation side the runtime talks back to: toasts and page changes.
///
/// Both calls are fire-and-forget.
pub trait Surface {
    fn notify(&mut self, notification: Notification);
    fn navigate_to(&mut self, route: Route);
}

/// Writes everything to the log and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSurface;

impl Surface for LogSurface {
    fn notify(&mut self, n: Notification) {
        let body = n.body.as_deref().unwrap_or("");
        match n.severity {
            Severity::Info => log::info!("[notify] {} {}", n.title, body),
            Severity::Error => log::error!("[notify] {} {}", n.title, body),
        }
    }

    fn navigate_to(&mut self, route: Route) {
        log::info!("[navigate] {}", route.path());
    }
}

/// Keeps every notification and navigation, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub notifications: Vec<Notification>,
    pub routes: Vec<Route>,
}

impl RecordingSurface {
    pub fn titles(&self) -> Vec<&str> {
        self.notifications.iter().map(|n| n.title.as_str()).collect()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

impl Surface for RecordingSurface {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn navigate_to(&mut self, route: Route) {
        self.routes.push(route);
    }
}

/// Logs and keeps a bounded window of the most recent notifications.
#[derive(Debug, Clone)]
pub struct RecentSurface {
    cap: usize,
    recent: VecDeque<Notification>,
    route: Route,
}

impl RecentSurface {
    pub const DEFAULT_CAPACITY: usize = 32;

    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            recent: VecDeque::new(),
            route: Route::Runtime,
        }
    }

    pub fn recent(&self) -> Vec<Notification> {
        self.recent.iter().cloned().collect()
    }

    pub fn route(&self) -> Route {
        self.route
    }
}

impl Default for RecentSurface {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Surface for RecentSurface {
    fn notify(&mut self, notification: Notification) {
        LogSurface.notify(notification.clone());
        self.recent.push_back(notification);
        while self.recent.len() > self.cap {
            self.recent.pop_front();
        }
    }

    fn navigate_to(&mut self, route: Route) {
        LogSurface.navigate_to(route);
        self.route = route;
    }
}
