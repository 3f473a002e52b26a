use std::fmt;

/// Screens addressable by path under the app's base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Markets,
    /// `None` is never produced by `parse`; it only comes from code that has no
    /// market selected, and its path reads back as `Markets`.
    MarketDetail(Option<String>),
    Settings,
    Login,
    NotFound(String),
}

impl Route {
    /// Accepts paths with or without the base path prefix.
    pub fn parse(path: &str, base_path: &str) -> Self {
        let base = base_path.trim_end_matches('/');
        let relative = if !base.is_empty() && path.starts_with(base) {
            let rest = &path[base.len()..];
            if rest.is_empty() || rest.starts_with('/') {
                rest
            } else {
                path
            }
        } else {
            path
        };

        let trimmed = relative.trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["markets"] => Route::Markets,
            ["markets", id] => Route::MarketDetail(Some((*id).to_string())),
            ["settings"] => Route::Settings,
            ["login"] => Route::Login,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Markets => "/markets".to_string(),
            Route::MarketDetail(Some(id)) => format!("/markets/{}", id),
            Route::MarketDetail(None) => "/markets/".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Login => "/login".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn full_path(&self, base_path: &str) -> String {
        match self {
            Route::NotFound(path) => path.clone(),
            _ => format!("{}{}", base_path.trim_end_matches('/'), self.path()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Markets => "Markets",
            Route::MarketDetail(_) => "Market",
            Route::Settings => "Bot Settings",
            Route::Login => "Login",
            Route::NotFound(_) => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
