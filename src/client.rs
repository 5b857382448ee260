// Report retrieval from the vendor reporting API.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use tracing::{info, warn};

use flate2::read::MultiGzDecoder;

use crate::error::RetrievalError;
use crate::planner::{Frequency, PlannedRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";
const SALES_PATH: &str = "/v1/salesReports";
const FINANCE_PATH: &str = "/v1/financeReports";

/// One report to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportQuery {
    /// Summary sales report for the day, week, month or year ending at `date`.
    Sales { date: NaiveDate, frequency: Frequency },
    /// Financial report for fiscal `period` of fiscal `year`, all regions.
    Finance { year: i32, period: u32 },
}

impl ReportQuery {
    /// Value of `filter[reportDate]`.
    pub fn report_date(&self) -> String {
        match *self {
            ReportQuery::Sales { date, .. } => date.format("%Y-%m-%d").to_string(),
            ReportQuery::Finance { year, period } => format!("{year:04}-{period:02}"),
        }
    }
}

impl From<PlannedRequest> for ReportQuery {
    fn from(req: PlannedRequest) -> Self {
        ReportQuery::Sales {
            date: req.date,
            frequency: req.frequency,
        }
    }
}

impl fmt::Display for ReportQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportQuery::Sales { frequency, .. } => {
                write!(f, "{} sales {}", frequency, self.report_date())
            }
            ReportQuery::Finance { .. } => write!(f, "finance {}", self.report_date()),
        }
    }
}

/// Anything that can produce raw report bytes.
pub trait ReportSource {
    fn fetch(&self, query: &ReportQuery) -> Result<Vec<u8>, RetrievalError>;
}

/// Blocking HTTP client for the reporting API.
///
/// Sends the bearer token as given; it is neither verified nor renewed here.
pub struct AppStoreClient {
    http: Client,
    base_url: String,
    vendor_number: String,
    token: String,
}

impl AppStoreClient {
    pub fn new(
        vendor_number: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RetrievalError> {
        Self::with_base_url(vendor_number, token, timeout, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        vendor_number: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self, RetrievalError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            vendor_number: vendor_number.into(),
            token: token.into(),
        })
    }

    fn params(&self, query: &ReportQuery) -> (&'static str, Vec<(&'static str, String)>) {
        let mut params = vec![("filter[reportDate]", query.report_date())];
        let path = match query {
            ReportQuery::Sales { frequency, .. } => {
                params.push(("filter[reportSubType]", "SUMMARY".to_string()));
                params.push(("filter[reportType]", "SALES".to_string()));
                params.push(("filter[frequency]", frequency.as_str().to_string()));
                SALES_PATH
            }
            ReportQuery::Finance { .. } => {
                params.push(("filter[reportType]", "FINANCIAL".to_string()));
                params.push(("filter[regionCode]", "ZZ".to_string()));
                FINANCE_PATH
            }
        };
        params.push(("filter[vendorNumber]", self.vendor_number.clone()));
        (path, params)
    }
}

impl ReportSource for AppStoreClient {
    fn fetch(&self, query: &ReportQuery) -> Result<Vec<u8>, RetrievalError> {
        let (path, params) = self.params(query);
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .http
            .get(&url)
            .header(ACCEPT, "application/a-gzip")
            .bearer_auth(&self.token)
            .query(&params)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!(%query, status = status.as_u16(), "report request rejected");
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let compressed = resp.bytes()?;
        let raw = gunzip(&compressed)?;
        info!(%query, bytes = raw.len(), "fetched report");
        Ok(raw)
    }
}

fn gunzip(compressed: &[u8]) -> Result<Vec<u8>, RetrievalError> {
    let mut out = Vec::new();
    MultiGzDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(RetrievalError::Decompress)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use httpmock::prelude::*;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn client(server: &MockServer) -> AppStoreClient {
        AppStoreClient::with_base_url("85000000", "tok", Duration::from_secs(5), server.base_url())
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetches_daily_sales() {
        let server = MockServer::start();
        let report = b"SKU\tUnits\nA\t1\n";
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/salesReports")
                .query_param("filter[reportDate]", "2019-06-22")
                .query_param("filter[reportType]", "SALES")
                .query_param("filter[reportSubType]", "SUMMARY")
                .query_param("filter[frequency]", "DAILY")
                .query_param("filter[vendorNumber]", "85000000")
                .header("authorization", "Bearer tok")
                .header("accept", "application/a-gzip");
            then.status(200)
                .header("content-type", "application/a-gzip")
                .body(gzip(report));
        });

        let query = ReportQuery::Sales {
            date: date(2019, 6, 22),
            frequency: Frequency::Daily,
        };
        let raw = client(&server).fetch(&query).unwrap();
        mock.assert();
        assert_eq!(raw, report);
    }

    #[test]
    fn fetches_finance_period() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/financeReports")
                .query_param("filter[reportDate]", "2019-05")
                .query_param("filter[reportType]", "FINANCIAL")
                .query_param("filter[regionCode]", "ZZ");
            then.status(200).body(gzip(b"Vendor Identifier\tQuantity\n"));
        });

        let raw = client(&server)
            .fetch(&ReportQuery::Finance {
                year: 2019,
                period: 5,
            })
            .unwrap();
        mock.assert();
        assert_eq!(raw, b"Vendor Identifier\tQuantity\n");
    }

    #[test]
    fn non_success_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/salesReports");
            then.status(404).body("NOT_FOUND");
        });

        let err = client(&server)
            .fetch(&ReportQuery::Sales {
                date: date(2019, 6, 22),
                frequency: Frequency::Daily,
            })
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Status { status: 404, ref body } if body == "NOT_FOUND"));
    }

    #[test]
    fn plain_body_fails_decompression() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/salesReports");
            then.status(200).body("SKU\tUnits\n");
        });

        let err = client(&server)
            .fetch(&ReportQuery::Sales {
                date: date(2019, 6, 22),
                frequency: Frequency::Daily,
            })
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Decompress(_)));
    }

    #[test]
    fn sales_report_date_is_the_anchor_day() {
        let d = date(2019, 2, 10);
        let q = |frequency| ReportQuery::Sales { date: d, frequency };
        assert_eq!(q(Frequency::Daily).report_date(), "2019-02-10");
        assert_eq!(q(Frequency::Weekly).report_date(), "2019-02-10");
        assert_eq!(q(Frequency::Weekly).to_string(), "WEEKLY sales 2019-02-10");
    }
}
