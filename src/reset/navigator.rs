use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Optional data handed to the next route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationContext {
    pub message: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub context: NavigationContext,
}

/// Route transitions owned by the host application.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route, context: NavigationContext);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Navigation, NavigationContext, Navigator, Route};
    use std::sync::Mutex;

    /// Records every navigation for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNavigator {
        calls: Mutex<Vec<Navigation>>,
    }

    impl RecordingNavigator {
        pub fn calls(&self) -> Vec<Navigation> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route, context: NavigationContext) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(Navigation { route, context });
            }
        }
    }
}
