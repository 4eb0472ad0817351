//! Request interceptors.
//!
//! Interceptors run in ascending `order()`; equal orders keep registration
//! order. The chain is sorted once when the client is built and then applied
//! unchanged to every request.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::http::request::HttpRequest;

pub trait RequestInterceptor: Send + Sync {
    /// Lower runs first.
    fn order(&self) -> i32 {
        0
    }

    fn before_send(&self, request: &mut HttpRequest);
}

#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptorChain {
    pub fn new(mut interceptors: Vec<Arc<dyn RequestInterceptor>>) -> Self {
        interceptors.sort_by_key(|i| i.order());
        Self { interceptors }
    }

    pub fn apply(&self, request: &mut HttpRequest) {
        for interceptor in &self.interceptors {
            interceptor.before_send(request);
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orders: Vec<i32> = self.interceptors.iter().map(|i| i.order()).collect();
        f.debug_struct("InterceptorChain")
            .field("orders", &orders)
            .finish()
    }
}

/// Sets fixed headers on every request, replacing existing values.
#[derive(Debug, Clone, Default)]
pub struct HeaderInterceptor {
    headers: HeaderMap,
    order: i32,
}

impl HeaderInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let invalid = || Error::InvalidHeader {
            name: name.to_string(),
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

impl RequestInterceptor for HeaderInterceptor {
    fn order(&self) -> i32 {
        self.order
    }

    fn before_send(&self, request: &mut HttpRequest) {
        for (name, value) in &self.headers {
            request.headers.insert(name.clone(), value.clone());
        }
    }
}

/// Logs every outgoing request at debug level. Runs last by default.
#[derive(Debug, Clone, Copy)]
pub struct LoggingInterceptor {
    order: i32,
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self { order: i32::MAX }
    }
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestInterceptor for LoggingInterceptor {
    fn order(&self) -> i32 {
        self.order
    }

    fn before_send(&self, request: &mut HttpRequest) {
        tracing::debug!(
            method = %request.verb,
            url = %request.url,
            headers = request.headers.len(),
            query = request.query.len(),
            "Outgoing request"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestBody;
    use crate::routing::descriptor::HttpVerb;
    use std::sync::Mutex;

    fn request() -> HttpRequest {
        HttpRequest {
            verb: HttpVerb::Get,
            url: "/x".to_string(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: RequestBody::None,
        }
    }

    struct Recorder {
        label: &'static str,
        order: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RequestInterceptor for Recorder {
        fn order(&self) -> i32 {
            self.order
        }

        fn before_send(&self, _request: &mut HttpRequest) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    #[test]
    fn test_chain_runs_in_stable_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rec = |label: &'static str, order: i32| -> Arc<dyn RequestInterceptor> {
            Arc::new(Recorder {
                label,
                order,
                log: log.clone(),
            })
        };
        let chain = InterceptorChain::new(vec![
            rec("late", 10),
            rec("first-zero", 0),
            rec("early", -5),
            rec("second-zero", 0),
        ]);

        chain.apply(&mut request());
        chain.apply(&mut request());

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "early", "first-zero", "second-zero", "late",
                "early", "first-zero", "second-zero", "late"
            ]
        );
    }

    #[test]
    fn test_header_interceptor() {
        let interceptor = HeaderInterceptor::new()
            .header("Authorization", "Bearer t")
            .unwrap();
        let mut req = request();
        req.headers
            .insert("authorization", HeaderValue::from_static("old"));
        interceptor.before_send(&mut req);
        assert_eq!(req.header("authorization"), Some("Bearer t"));
    }

    #[test]
    fn test_header_interceptor_rejects_invalid() {
        assert!(matches!(
            HeaderInterceptor::new().header("bad name", "x"),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_logging_runs_last() {
        let logging: Arc<dyn RequestInterceptor> = Arc::new(LoggingInterceptor::new());
        let headers: Arc<dyn RequestInterceptor> = Arc::new(HeaderInterceptor::new().with_order(100));
        let chain = InterceptorChain::new(vec![logging, headers]);
        assert_eq!(format!("{chain:?}"), "InterceptorChain { orders: [100, 2147483647] }");
    }
}
