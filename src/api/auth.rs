use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiClient, Error};
use crate::models::{AuthSession, DriverInfo, Role, UserId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: LoginUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginUser {
    id: UserId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    driver_info: Option<LoginDriverInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoginDriverInfo {
    #[serde(default, alias = "licenseNumber")]
    license_number: String,
    #[serde(default, alias = "carPlate")]
    car_plate: String,
    #[serde(default, alias = "carModel")]
    car_model: String,
    #[serde(default, alias = "phoneNumber")]
    phone_number: String,
}

impl From<LoginDriverInfo> for DriverInfo {
    fn from(value: LoginDriverInfo) -> Self {
        Self {
            license_number: value.license_number,
            car_plate: value.car_plate,
            car_model: value.car_model,
            phone_number: value.phone_number,
        }
    }
}

impl From<LoginResponse> for AuthSession {
    fn from(value: LoginResponse) -> Self {
        let role = value
            .user
            .role
            .as_deref()
            .and_then(|role| role.parse().ok())
            .unwrap_or(Role::Passenger);
        Self {
            token: value.token,
            user_id: value.user.id,
            role,
            full_name: value.user.name.unwrap_or_default(),
            driver_info: value.user.driver_info.map(Into::into),
        }
    }
}

impl ApiClient {
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), Error> {
        let url = self.url("/api/auth/signup", &[])?;
        self.send_json(Method::POST, url, request).await?;
        info!("Signed up {}", request.email);
        Ok(())
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, Error> {
        let url = self.url("/api/auth/login", &[])?;
        let body = self.send_json(Method::POST, url, request).await?;
        let response: LoginResponse = serde_json::from_str(&body)?;
        info!("Logged in {} as user {}", request.email, response.user.id);
        Ok(response.into())
    }
}

#[test]
fn login_response_maps_driver_info() {
    let response: LoginResponse = serde_json::from_str(
        r#"{
            "token": "abc",
            "user": {
                "id": 12,
                "name": "Nour",
                "role": "Driver",
                "driverInfo": { "LicenseNumber": "L-1", "CarPlate": "B123456", "CarModel": "Corolla", "PhoneNumber": "+961" }
            }
        }"#,
    )
    .unwrap();
    let session = AuthSession::from(response);
    assert_eq!(session.role, Role::Driver);
    assert_eq!(session.user_id, 12);
    assert_eq!(session.driver_info.unwrap().car_plate, "B123456");
}
