use serde::{Deserialize, Serialize};
use url::Url;
use wayfinder_net::{NetworkError, Response};
use wayfinder_primitives::Coordinate;

/// Response schema of an IP-geolocation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpProviderKind {
	/// `ipapi.co`: `latitude`/`longitude`, `error`/`reason` on failure.
	IpapiCo,
	/// `ip-api.com`: `status`, `lat`/`lon`, `message` on failure.
	IpApiCom,
}

/// One IP-geolocation endpoint and the schema it answers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpProvider {
	pub kind: IpProviderKind,
	pub url: Url,
}

impl IpProvider {
	pub fn new(kind: IpProviderKind, url: Url) -> Self {
		Self { kind, url }
	}

	/// Public providers, tried in this order.
	pub fn defaults() -> Vec<Self> {
		[
			(IpProviderKind::IpapiCo, "https://ipapi.co/json/"),
			(IpProviderKind::IpApiCom, "http://ip-api.com/json/"),
		]
		.into_iter()
		.filter_map(|(kind, url)| Url::parse(url).ok().map(|url| Self { kind, url }))
		.collect()
	}

	/// Host name used in log fields.
	pub fn host(&self) -> &str {
		self.url.host_str().unwrap_or("unknown")
	}

	pub(crate) fn decode(&self, response: &Response) -> Result<Coordinate, NetworkError> {
		let (lat, lon) = match self.kind {
			IpProviderKind::IpapiCo => {
				let body: IpapiCo = response.json()?;
				if body.error {
					return Err(NetworkError::schema(format!(
						"ipapi.co error: {}",
						body.reason.unwrap_or_default()
					)));
				}
				(body.latitude, body.longitude)
			}
			IpProviderKind::IpApiCom => {
				let body: IpApiCom = response.json()?;
				if body.status.as_deref().is_some_and(|s| s != "success") {
					return Err(NetworkError::schema(format!(
						"ip-api.com error: {}",
						body.message.unwrap_or_default()
					)));
				}
				(body.lat, body.lon)
			}
		};
		let (Some(lat), Some(lon)) = (lat, lon) else {
			return Err(NetworkError::schema("missing coordinates"));
		};
		Coordinate::new(lat, lon).map_err(|e| NetworkError::schema(e.to_string()))
	}
}

#[derive(Debug, Deserialize)]
struct IpapiCo {
	latitude: Option<f64>,
	longitude: Option<f64>,
	#[serde(default)]
	error: bool,
	reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpApiCom {
	status: Option<String>,
	lat: Option<f64>,
	lon: Option<f64>,
	message: Option<String>,
}
