/// Endpoint Integration Test Suite
///
/// Drives a running server through the whole scheduling flow over HTTP.
///
/// Test Categories:
/// - Login and token validation
/// - Practitioner and patient registration
/// - Slot lifecycle (create, approve, freeze, unfreeze)
/// - Booking, double-booking and availability
/// - Relationship-scoped patient record access
///
/// The server must be started with BOOTSTRAP_ADMIN_IDENTIFIER and
/// BOOTSTRAP_ADMIN_PASSWORD matching E2E_ADMIN_IDENTIFIER / E2E_ADMIN_PASSWORD.

use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const TEST_DATE: &str = "2031-03-03";
const TEST_PASSWORD: &str = "Endpoint-Suite-42";

type TestError = Box<dyn std::error::Error>;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Test client with authentication capabilities
#[derive(Clone)]
pub struct ApiTestClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiTestClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: env_or("E2E_BASE_URL", DEFAULT_BASE_URL),
            auth_token: None,
        }
    }

    /// Log in through the API and keep the returned token
    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<Value, TestError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(format!("login failed with {}", response.status()).into());
        }

        let body: Value = response.json().await?;
        let token = body
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or("login response has no token")?;
        self.auth_token = Some(token.to_string());
        Ok(body)
    }

    pub fn with_token(&self, token: &str) -> Self {
        Self {
            auth_token: Some(token.to_string()),
            ..self.clone()
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token {
            Some(ref token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, TestError> {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        Ok(self.authorize(request).send().await?)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Response, TestError> {
        let request = self.client.post(format!("{}{}", self.base_url, path)).json(&body);
        Ok(self.authorize(request).send().await?)
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Response, TestError> {
        let request = self.client.patch(format!("{}{}", self.base_url, path)).json(&body);
        Ok(self.authorize(request).send().await?)
    }
}

/// Test results tracker
#[derive(Debug, Default)]
pub struct TestResults {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub failures: Vec<String>,
}

impl TestResults {
    pub fn pass(&mut self, test_name: &str) {
        self.passed += 1;
        println!("✅ {}", test_name);
    }

    pub fn fail(&mut self, test_name: &str, error: &str) {
        self.failed += 1;
        self.failures.push(format!("{}: {}", test_name, error));
        println!("❌ {}: {}", test_name, error);
    }

    pub fn skip(&mut self, test_name: &str, reason: &str) {
        self.skipped += 1;
        println!("⚠️ {} (skipped: {})", test_name, reason);
    }

    /// Records pass/fail from the response status and returns the JSON body.
    pub async fn expect_status(
        &mut self,
        test_name: &str,
        response: Result<Response, TestError>,
        expected: StatusCode,
    ) -> Option<Value> {
        match response {
            Ok(response) if response.status() == expected => {
                self.pass(test_name);
                response.json().await.ok()
            }
            Ok(response) => {
                self.fail(test_name, &format!("Status: {} (expected {})", response.status(), expected));
                None
            }
            Err(e) => {
                self.fail(test_name, &e.to_string());
                None
            }
        }
    }

    pub fn summary(&self) {
        println!("\n📊 Test Summary:");
        println!("✅ Passed: {}", self.passed);
        println!("❌ Failed: {}", self.failed);
        println!("⚠️ Skipped: {}", self.skipped);

        if !self.failures.is_empty() {
            println!("\n🔍 Failures:");
            for failure in &self.failures {
                println!("  - {}", failure);
            }
        }
    }
}

fn string_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(|v| v.as_str())
}

pub async fn run_endpoint_tests() -> Result<TestResults, TestError> {
    let mut admin = ApiTestClient::new();
    let mut results = TestResults::default();
    let run = Uuid::new_v4().simple().to_string();

    println!("🚀 Starting Endpoint Integration Tests");
    println!("📍 Base URL: {}", admin.base_url);

    // AUTHENTICATION
    println!("\n🔐 Authentication Tests");

    let admin_identifier = env_or("E2E_ADMIN_IDENTIFIER", "admin@clinic.local");
    let admin_password = env_or("E2E_ADMIN_PASSWORD", "Bootstrap-Admin-1");
    match admin.login(&admin_identifier, &admin_password).await {
        Ok(_) => results.pass("Admin Login"),
        Err(e) => {
            results.fail("Admin Login", &e.to_string());
            return Ok(results); // Can't continue without auth
        }
    }

    let response = admin.post("/auth/validate", json!({})).await;
    results.expect_status("Token Validation", response, StatusCode::OK).await;

    let response = ApiTestClient::new().post("/slots", json!({})).await;
    results.expect_status("Protected Route Without Token", response, StatusCode::UNAUTHORIZED).await;

    // REGISTRATION
    println!("\n👥 Registration Tests");

    let mut practitioners = Vec::new();
    for name in ["Quinn", "Grey"] {
        let identifier = format!("{}-{}@clinic.test", name.to_lowercase(), run);
        let response = admin
            .post(
                "/practitioners",
                json!({
                    "display_name": format!("Dr. {}", name),
                    "specialty": "General Practice",
                    "years_of_experience": 10,
                    "identifier": identifier,
                    "password": TEST_PASSWORD
                }),
            )
            .await;
        let created = results
            .expect_status(&format!("Create Practitioner {}", name), response, StatusCode::OK)
            .await;

        let mut client = ApiTestClient::new();
        match (created, client.login(&identifier, TEST_PASSWORD).await) {
            (Some(created), Ok(_)) => {
                results.pass(&format!("Practitioner {} Login", name));
                practitioners.push((string_at(&created, "/id").unwrap_or_default().to_string(), client));
            }
            (_, Err(e)) => results.fail(&format!("Practitioner {} Login", name), &e.to_string()),
            (None, Ok(_)) => results.fail(&format!("Practitioner {} Login", name), "no profile created"),
        }
    }

    let mut patients = Vec::new();
    for name in ["Ada", "Alan"] {
        let response = ApiTestClient::new()
            .post(
                "/patients/signup",
                json!({
                    "display_name": name,
                    "identifier": format!("{}-{}@clinic.test", name.to_lowercase(), run),
                    "password": TEST_PASSWORD
                }),
            )
            .await;
        if let Some(body) = results
            .expect_status(&format!("Patient {} Signup", name), response, StatusCode::OK)
            .await
        {
            if let (Some(id), Some(token)) = (string_at(&body, "/patient/id"), string_at(&body, "/token")) {
                patients.push((id.to_string(), admin.with_token(token)));
            }
        }
    }

    if practitioners.len() < 2 || patients.len() < 2 {
        results.skip("Scheduling Flow", "registration did not complete");
        return Ok(results);
    }
    let (practitioner_id, practitioner) = &practitioners[0];
    let (_, other_practitioner) = &practitioners[1];
    let (patient_id, patient) = &patients[0];
    let (other_patient_id, other_patient) = &patients[1];

    // SLOT LIFECYCLE
    println!("\n🗓️ Slot Lifecycle Tests");

    let response = admin
        .post(
            "/slots",
            json!({ "practitioner_id": practitioner_id, "date": TEST_DATE, "times": ["09:00", "09:30"] }),
        )
        .await;
    let slots = results.expect_status("Create Slots", response, StatusCode::OK).await;
    let first_slot = slots
        .as_ref()
        .and_then(|s| string_at(s, "/0/id"))
        .map(str::to_string)
        .unwrap_or_default();

    let response = practitioner.post(&format!("/slots/{}/approve", first_slot), json!({})).await;
    results.expect_status("Approve Own Slot", response, StatusCode::OK).await;

    let response = practitioner.post(&format!("/slots/{}/approve", first_slot), json!({})).await;
    results.expect_status("Re-approve Is Rejected", response, StatusCode::UNPROCESSABLE_ENTITY).await;

    let availability_path = format!(
        "/appointments/availability?practitioner_id={}&date={}",
        practitioner_id, TEST_DATE
    );
    let response = patient.get(&availability_path).await;
    match results.expect_status("Availability Before Booking", response, StatusCode::OK).await {
        Some(body) if body == json!({ "is_full": false, "available_slots": ["09:00"] }) => {}
        Some(body) => results.fail("Availability Before Booking Body", &body.to_string()),
        None => {}
    }

    // BOOKING
    println!("\n📋 Booking Tests");

    let booking = |patient_id: &str, name: &str| {
        json!({
            "practitioner_id": practitioner_id,
            "date": TEST_DATE,
            "time": "09:00",
            "patient_id": patient_id,
            "patient_name": name
        })
    };

    let response = other_patient.post("/appointments/book", booking(patient_id.as_str(), "Ada")).await;
    results.expect_status("Booking For Another Patient Is Forbidden", response, StatusCode::FORBIDDEN).await;

    let response = patient.post("/appointments/book", booking(patient_id.as_str(), "Ada")).await;
    results.expect_status("Book Available Slot", response, StatusCode::OK).await;

    let response = other_patient.post("/appointments/book", booking(other_patient_id.as_str(), "Alan")).await;
    results.expect_status("Double Booking Is Rejected", response, StatusCode::CONFLICT).await;

    let response = patient.get(&availability_path).await;
    match results.expect_status("Availability After Booking", response, StatusCode::OK).await {
        Some(body) if body == json!({ "is_full": true, "available_slots": [] }) => {}
        Some(body) => results.fail("Availability After Booking Body", &body.to_string()),
        None => {}
    }

    // RELATIONSHIP-SCOPED ACCESS
    println!("\n🔒 Patient Record Access Tests");

    let record_path = format!("/patients/{}", patient_id);
    let response = practitioner.get(&record_path).await;
    results.expect_status("Treating Practitioner Reads Record", response, StatusCode::OK).await;

    let response = other_practitioner.get(&record_path).await;
    results.expect_status("Unrelated Practitioner Is Forbidden", response, StatusCode::FORBIDDEN).await;

    let response = other_practitioner.get(&format!("/patients/{}", Uuid::new_v4())).await;
    results.expect_status("Unknown Patient Looks The Same", response, StatusCode::FORBIDDEN).await;

    let response = practitioner
        .post(
            &format!("{}/prescriptions", record_path),
            json!({ "medication": "Amoxicillin", "dosage": "500mg" }),
        )
        .await;
    results.expect_status("Treating Practitioner Prescribes", response, StatusCode::OK).await;

    let response = admin.get(&format!("/patients/{}", other_patient_id)).await;
    results.expect_status("Admin Reads Any Record", response, StatusCode::OK).await;

    // FREEZE / UNFREEZE
    println!("\n🧊 Freeze Tests");

    let second_slot = slots
        .as_ref()
        .and_then(|s| string_at(s, "/1/id"))
        .map(str::to_string)
        .unwrap_or_default();
    let response = admin
        .patch(&format!("/slots/{}/status", second_slot), json!({ "status": "FROZEN" }))
        .await;
    results.expect_status("Freeze Pending Slot", response, StatusCode::OK).await;

    let response = admin
        .patch(&format!("/slots/{}/status", second_slot), json!({ "status": "PENDING" }))
        .await;
    results.expect_status("Unfreeze Slot", response, StatusCode::OK).await;

    let response = admin
        .patch(&format!("/slots/{}/status", first_slot), json!({ "status": "FROZEN" }))
        .await;
    results.expect_status("Booked Slot Cannot Be Frozen", response, StatusCode::UNPROCESSABLE_ENTITY).await;

    Ok(results)
}

#[tokio::main]
async fn main() -> Result<(), TestError> {
    let results = run_endpoint_tests().await?;
    results.summary();

    if results.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a running server"]
    async fn test_endpoint_integration() {
        let results = run_endpoint_tests().await.expect("Test execution failed");

        assert_eq!(results.failed, 0, "{:?}", results.failures);
        assert!(results.passed >= 20, "Core flow should run to the end");
    }

    #[tokio::test]
    #[ignore = "requires a running server"]
    async fn test_authentication_flow() {
        let mut client = ApiTestClient::new();

        client
            .login(
                &env_or("E2E_ADMIN_IDENTIFIER", "admin@clinic.local"),
                &env_or("E2E_ADMIN_PASSWORD", "Bootstrap-Admin-1"),
            )
            .await
            .expect("Login should work");

        let response = client.post("/auth/validate", json!({})).await.expect("Validated request should work");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
