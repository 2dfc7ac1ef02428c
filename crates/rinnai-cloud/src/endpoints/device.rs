//! Device queries and shadow commands.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, instrument};

use rinnai_core::types::{validate_duration, validate_temperature};
use rinnai_core::{ApiResponse, DeviceRef, Endpoints, Error, Method, Result, TemperatureUnit};

use super::catalog::{self, COMMAND_HEADERS, GRAPHQL_HEADERS};
use super::graphql_data;
use crate::pipeline::{AuthenticatedRequestPipeline, RequestOptions};

/// Reads device state and patches the device shadow.
///
/// Argument validation happens before any request; invalid input is
/// returned as `Err`, while request outcomes are folded into the
/// [`ApiResponse`].
#[derive(Debug, Clone)]
pub struct DeviceApi {
    pipeline: Arc<AuthenticatedRequestPipeline>,
    endpoints: Endpoints,
}

impl DeviceApi {
    pub(crate) fn new(pipeline: Arc<AuthenticatedRequestPipeline>, endpoints: Endpoints) -> Self {
        Self {
            pipeline,
            endpoints,
        }
    }

    /// Fetch a device record by id.
    #[instrument(skip(self))]
    pub async fn get_info(&self, device_id: &str) -> Result<ApiResponse> {
        let url = &self.endpoints.graphql;
        let options = RequestOptions::new()
            .headers(GRAPHQL_HEADERS)
            .body(catalog::graphql_payload(
                catalog::GET_DEVICE_QUERY,
                json!({ "id": device_id }),
            ));

        let outcome = self
            .pipeline
            .execute(Method::Post, url, options)
            .await
            .and_then(|payload| graphql_data(url, payload).map_err(Error::from));

        Ok(match outcome {
            Ok(data) => ApiResponse::ok(
                data.and_then(|mut data| data.get_mut("getDevice").map(Value::take)),
            ),
            Err(err) => ApiResponse::failure(&err),
        })
    }

    /// Set the domestic water temperature.
    ///
    /// # Errors
    ///
    /// Returns a validation error outside 100-140 °F (38-60 °C).
    #[instrument(skip(self), fields(thing = %device))]
    pub async fn set_temperature(
        &self,
        device: &DeviceRef,
        value: f64,
        unit: TemperatureUnit,
    ) -> Result<ApiResponse> {
        let fahrenheit = validate_temperature(value, unit)?;
        self.patch_shadow(device, catalog::set_temperature_body(fahrenheit))
            .await
    }

    /// Start recirculation for `minutes`.
    ///
    /// # Errors
    ///
    /// Returns a validation error outside 1-60 minutes.
    #[instrument(skip(self), fields(thing = %device))]
    pub async fn start_recirculation(&self, device: &DeviceRef, minutes: i64) -> Result<ApiResponse> {
        let minutes = validate_duration(minutes)?;
        self.patch_shadow(device, catalog::start_recirculation_body(minutes))
            .await
    }

    #[instrument(skip(self), fields(thing = %device))]
    pub async fn stop_recirculation(&self, device: &DeviceRef) -> Result<ApiResponse> {
        self.patch_shadow(device, catalog::stop_recirculation_body())
            .await
    }

    #[instrument(skip(self), fields(thing = %device))]
    pub async fn turn_on(&self, device: &DeviceRef) -> Result<ApiResponse> {
        self.patch_shadow(device, catalog::operation_body(true)).await
    }

    #[instrument(skip(self), fields(thing = %device))]
    pub async fn turn_off(&self, device: &DeviceRef) -> Result<ApiResponse> {
        self.patch_shadow(device, catalog::operation_body(false)).await
    }

    /// Ask the heater to upload its maintenance data.
    #[instrument(skip(self), fields(thing = %device))]
    pub async fn do_maintenance_retrieval(&self, device: &DeviceRef) -> Result<ApiResponse> {
        self.patch_shadow(device, catalog::maintenance_retrieval_body())
            .await
    }

    async fn patch_shadow(&self, device: &DeviceRef, body: Value) -> Result<ApiResponse> {
        let url = self.endpoints.shadow_url(device.thing_name());
        debug!(%body, "Patching device shadow");

        let options = RequestOptions::new()
            .headers(COMMAND_HEADERS)
            .body(body.to_string());
        let outcome = self.pipeline.execute(Method::Patch, &url, options).await;
        Ok(ApiResponse::from_outcome(outcome))
    }
}
