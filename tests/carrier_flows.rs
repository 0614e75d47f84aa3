//! End-to-end client flows against an in-memory transport

use async_trait::async_trait;
use futures_util::future::join_all;
use parcel_carriers::carriers::dhl::{
    DhlConsignee, DhlParcelClients, DhlShipmentRequest, DhlTrackingClient, LocationFinderClient,
};
use parcel_carriers::carriers::go_express::{GoExpressClient, GoFlags, GoShipmentRequest, TimeWindow};
use parcel_carriers::config::{DhlParcelConfig, DhlTrackingConfig, GoExpressConfig, LocationFinderConfig};
use parcel_carriers::domain::{
    Address, Dimensions, LocationQuery, Package, PickupDate, PickupLocation, PickupRequest, ShipmentRequest,
    TrackingStatus, Weight,
};
use parcel_carriers::http::{HttpRequest, HttpResponse, HttpTransport, RequestBody};
use parcel_carriers::{CarrierError, DimensionUnit, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers by URL substring and records every request
struct FakeTransport {
    routes: Vec<(&'static str, HttpResponse)>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Duration,
}

impl FakeTransport {
    fn new(routes: Vec<(&'static str, HttpResponse)>) -> Arc<Self> {
        Arc::new(Self {
            routes,
            requests: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        })
    }

    fn with_latency(routes: Vec<(&'static str, HttpResponse)>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            routes,
            requests: Mutex::new(Vec::new()),
            latency,
        })
    }

    fn requests_to(&self, fragment: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| HttpResponse::new(404, "no route"));
        Ok(response)
    }
}

fn json_body(request: &HttpRequest) -> Value {
    match &request.body {
        Some(RequestBody::Json(value)) => value.clone(),
        other => panic!("expected JSON body, got {other:?}"),
    }
}

fn token_route() -> (&'static str, HttpResponse) {
    (
        "/account/auth/ropc/v1/token",
        HttpResponse::new(200, r#"{"access_token":"sandbox-token","token_type":"Bearer","expires_in":1799}"#),
    )
}

const SHIPMENT_CREATED: &str = r#"{
    "status": {"title": "OK", "statusCode": 200},
    "items": [{
        "shipmentNo": "340434310428091700",
        "sstatus": {"title": "OK", "statusCode": 200},
        "label": {"b64": "JVBERi0x", "fileFormat": "PDF"}
    }]
}"#;

fn dhl_config() -> DhlParcelConfig {
    DhlParcelConfig::builder()
        .client_id("app-key")
        .client_secret("app-secret")
        .username("user-valid")
        .password("SandboxPasswort2023!")
        .build()
        .unwrap()
}

fn shipment(package: Package) -> DhlShipmentRequest {
    let request = ShipmentRequest::new(
        Address::new("My Online Shop GmbH", "Sträßchensweg", "10", "53113", "Bonn", "DEU"),
        Address::new("Maria Musterfrau", "Kurt-Schumacher-Str.", "20", "53113", "Bonn", "DEU"),
        package,
    );
    DhlShipmentRequest::new(request, "33333333330102", "V01PAK")
}

#[tokio::test]
async fn dhl_shipment_converts_units_on_the_wire() {
    let transport = FakeTransport::new(vec![
        token_route(),
        ("/shipping/v2/orders", HttpResponse::new(200, SHIPMENT_CREATED)),
    ]);
    let dhl = DhlParcelClients::new(&dhl_config(), transport.clone()).unwrap();

    let package = Package::new(Weight::grams(2500.0))
        .with_dimensions(Dimensions::new(300.0, 200.0, 150.0, DimensionUnit::Millimeter));
    let created = dhl.shipping.create_shipment(&shipment(package)).await.unwrap();

    assert_eq!(created.shipment_number, "340434310428091700");
    assert_eq!(created.labels[0].content, b"%PDF-1");

    let sent = transport.requests_to("/shipping/v2/orders");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].url.contains("docFormat=PDF"));
    assert_eq!(sent[0].header_value("authorization"), Some("Bearer sandbox-token"));
    assert_eq!(sent[0].header_value("dhl-api-key"), Some("app-key"));

    let details = &json_body(&sent[0])["shipments"][0]["details"];
    assert_eq!(details["weight"]["value"], 2.5);
    assert_eq!(details["weight"]["uom"], "kg");
    assert_eq!(details["dim"]["length"], 30);
    assert_eq!(details["dim"]["width"], 20);
    assert_eq!(details["dim"]["height"], 15);
}

#[tokio::test]
async fn dhl_error_body_detail_reaches_the_message() {
    let transport = FakeTransport::new(vec![
        token_route(),
        (
            "/shipping/v2/orders",
            HttpResponse::new(400, r#"{"status":{"detail":"Invalid billing number."}}"#),
        ),
    ]);
    let dhl = DhlParcelClients::new(&dhl_config(), transport).unwrap();

    let err = dhl
        .shipping
        .create_shipment(&shipment(Package::new(Weight::kilograms(1.0))))
        .await
        .unwrap_err();

    assert!(err.is_api_error());
    assert_eq!(err.status_code(), Some(400));
    let message = err.to_string();
    assert!(message.contains("400"), "{message}");
    assert!(message.contains("Invalid billing number."), "{message}");
    assert_eq!(err.response_body(), Some(r#"{"status":{"detail":"Invalid billing number."}}"#));
}

#[tokio::test]
async fn dhl_locker_consignee_drops_street_fields() {
    let transport = FakeTransport::new(vec![
        token_route(),
        ("/shipping/v2/orders", HttpResponse::new(200, SHIPMENT_CREATED)),
    ]);
    let dhl = DhlParcelClients::new(&dhl_config(), transport.clone()).unwrap();

    let request = shipment(Package::new(Weight::kilograms(1.0))).with_consignee(DhlConsignee::Locker {
        locker_id: 118,
        post_number: "12345678".to_string(),
    });
    dhl.shipping.create_shipment(&request).await.unwrap();

    let body = json_body(&transport.requests_to("/shipping/v2/orders")[0]);
    let consignee = &body["shipments"][0]["consignee"];
    assert_eq!(consignee["lockerID"], 118);
    assert!(consignee.get("addressStreet").is_none());
    assert!(consignee.get("addressHouse").is_none());
}

#[tokio::test]
async fn invalid_requests_never_reach_the_network() {
    let transport = FakeTransport::new(vec![token_route()]);
    let dhl = DhlParcelClients::new(&dhl_config(), transport.clone()).unwrap();

    let mut request = shipment(Package::new(Weight::kilograms(1.0)));
    request.shipment.packages.push(Package::new(Weight::kilograms(1.0)));
    let err = dhl.shipping.create_shipment(&request).await.unwrap_err();
    assert!(matches!(err, CarrierError::PackageCardinality { actual: 2, .. }));

    let request = shipment(Package::new(Weight::kilograms(1.0))).with_consignee(DhlConsignee::PoBox { po_box_id: 0 });
    let err = dhl.shipping.create_shipment(&request).await.unwrap_err();
    assert!(matches!(err, CarrierError::InvalidConsignee { .. }));

    assert!(transport.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn parcel_clients_share_one_token() {
    let transport = FakeTransport::with_latency(
        vec![
            token_route(),
            ("/shipping/v2/orders", HttpResponse::new(200, SHIPMENT_CREATED)),
            (
                "/transportation/pickup/v3/orders",
                HttpResponse::new(200, r#"{"confirmation": {"value": {"orderID": "pickup-1", "freeOfCharge": true}}}"#),
            ),
        ],
        Duration::from_millis(20),
    );
    let dhl = DhlParcelClients::new(&dhl_config(), transport.clone()).unwrap();

    let requests: Vec<DhlShipmentRequest> = (0..10)
        .map(|_| shipment(Package::new(Weight::kilograms(1.0))))
        .collect();
    let results = join_all(requests.iter().map(|r| dhl.shipping.create_shipment(r))).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let pickup = PickupRequest {
        billing_number: "22222222220801".to_string(),
        location: PickupLocation::Id("8000123".to_string()),
        date: PickupDate::Asap,
        total_weight: None,
        comment: None,
        contacts: Vec::new(),
        shipment_numbers: vec!["340434310428091700".to_string()],
    };
    let confirmation = dhl.pickup.create_pickup(&pickup).await.unwrap();
    assert_eq!(confirmation.order_id, "pickup-1");

    assert_eq!(transport.requests_to("/token").len(), 1);
    assert_eq!(transport.requests_to("/shipping/v2/orders").len(), 10);
    assert!(transport
        .requests_to("/orders")
        .iter()
        .all(|r| r.header_value("Authorization") == Some("Bearer sandbox-token")));
}

#[tokio::test]
async fn token_endpoint_failure_is_an_authentication_error() {
    let transport = FakeTransport::new(vec![(
        "/token",
        HttpResponse::new(401, r#"{"detail":"Invalid credentials"}"#),
    )]);
    let dhl = DhlParcelClients::new(&dhl_config(), transport.clone()).unwrap();

    let err = dhl
        .shipping
        .create_shipment(&shipment(Package::new(Weight::kilograms(1.0))))
        .await
        .unwrap_err();

    match err {
        CarrierError::AuthenticationFailed { status_code, message, .. } => {
            assert_eq!(status_code, Some(401));
            assert!(message.contains("Invalid credentials"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(transport.requests_to("/shipping/v2/orders").is_empty());
}

#[tokio::test]
async fn go_express_flags_and_basic_auth() {
    let transport = FakeTransport::new(vec![(
        "/api/v1/createShipment",
        HttpResponse::new(
            200,
            r#"{"hwbNumber": "401234567890", "hwbOrPackageLabel": "JVBERi0x", "package": [{"barcode": "GO1"}]}"#,
        ),
    )]);
    let client = GoExpressClient::new(GoExpressConfig::new("go-user", "go-pass", "FRA", "1234567"), transport.clone())
        .unwrap();

    let shipment = ShipmentRequest::new(
        Address::new("Absender AG", "Mainzer Landstr.", "50", "60325", "Frankfurt", "DE"),
        Address::new("Empfänger GmbH", "Königsallee", "1", "40212", "Düsseldorf", "DE"),
        Package::new(Weight::kilograms(2.5)),
    );
    let window = TimeWindow {
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        from: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        till: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    };
    let request = GoShipmentRequest::new(shipment, "Ersatzteile", window).with_flags(GoFlags {
        self_pickup: true,
        freight_collect: false,
        ..Default::default()
    });

    let result = client.create_shipment(&request).await.unwrap();
    assert_eq!(result.shipment.shipment_number, "401234567890");
    assert_eq!(result.package_barcodes, vec!["GO1"]);

    let sent = transport.requests_to("/api/v1/createShipment");
    assert_eq!(sent[0].header_value("Authorization"), Some("Basic Z28tdXNlcjpnby1wYXNz"));

    let body = json_body(&sent[0]);
    assert_eq!(body["shipment"]["selfPickup"], "Yes");
    assert!(body["shipment"].get("freightCollect").is_none());
    assert_eq!(body["shipment"]["weight"], "2.50");
    assert_eq!(body["shipment"]["pickup"]["date"], "07.03.2024");
    assert_eq!(body["consigneeAddress"]["city"], "Düsseldorf");
}

#[tokio::test]
async fn go_express_tracking_without_items_is_an_error() {
    let transport = FakeTransport::new(vec![("/api/v1/tracking", HttpResponse::new(200, r#"{"trackingItems": []}"#))]);
    let client = GoExpressClient::new(GoExpressConfig::new("u", "p", "FRA", "1"), transport.clone()).unwrap();

    let err = client.track_shipment("401234567890").await.unwrap_err();
    assert!(err.is_deserialization_error());
    assert!(transport.requests_to("/api/v1/tracking")[0].url.contains("hwbNumber=401234567890"));
}

#[tokio::test]
async fn dhl_xml_tracking_flow() {
    let delivered = r#"<?xml version="1.0" encoding="UTF-8"?>
<data name="pieceshipmentlist" code="0">
  <data name="piece-shipment" piece-code="00340434161094042557" delivery-event-flag="1" piece-status="2">
    <data name="piece-event-list">
      <data name="piece-event" event-timestamp="18.03.2016 10:02" event-location="Bonn"
            event-country="Deutschland" event-text="Zugestellt" standard-event-code="ZU"/>
    </data>
  </data>
</data>"#;
    let transport = FakeTransport::new(vec![("sendungsverfolgung", HttpResponse::new(200, delivered))]);
    let client = DhlTrackingClient::new(DhlTrackingConfig::new("zt12345", "geheim"), transport.clone()).unwrap();

    let result = client.track("00340434161094042557").await.unwrap();
    assert_eq!(result.status, TrackingStatus::Delivered);
    assert_eq!(result.events.len(), 1);

    let sent = transport.requests_to("sendungsverfolgung");
    assert!(sent[0].url.contains("?xml=%3C%3Fxml"));
    assert!(sent[0].url.contains("d-get-piece-detail"));
    assert!(sent[0].header_value("Authorization").is_none());
}

#[tokio::test]
async fn dhl_xml_tracking_carrier_error() {
    let failed = r#"<data name="pieceshipmentlist" code="100" error="Es liegen keine Daten vor."/>"#;
    let transport = FakeTransport::new(vec![("sendungsverfolgung", HttpResponse::new(200, failed))]);
    let mut config = DhlTrackingConfig::new("zt12345", "geheim");
    config.gateway_credentials = Some(("portal-user".to_string(), "portal-key".to_string()));
    let client = DhlTrackingClient::new(config, transport.clone()).unwrap();

    let err = client.track("123").await.unwrap_err();
    assert!(matches!(err, CarrierError::CarrierFault { code: 100, .. }));
    assert!(transport.requests_to("sendungsverfolgung")[0]
        .header_value("Authorization")
        .is_some_and(|v| v.starts_with("Basic ")));
}

#[tokio::test]
async fn location_finder_sends_api_key_and_accepts_empty_results() {
    let transport = FakeTransport::new(vec![("/find-by-address", HttpResponse::new(200, r#"{"locations": []}"#))]);
    let client = LocationFinderClient::new(&LocationFinderConfig::new("lf-key"), transport.clone()).unwrap();

    let query = LocationQuery {
        country_code: "DE".to_string(),
        postal_code: Some("53113".to_string()),
        city: None,
        street: None,
        radius_meters: None,
        limit: Some(5),
    };
    let points = client.find_by_address(&query).await.unwrap();
    assert!(points.is_empty());

    let sent = transport.requests_to("/find-by-address");
    assert_eq!(sent[0].header_value("DHL-API-Key"), Some("lf-key"));
    assert!(sent[0].url.contains("postalCode=53113"));
    assert!(sent[0].url.contains("limit=5"));
}
