//! Control commands and status datasets of the NFD management protocol.
//!
//! [`Nfdc`] binds a face, an optional command signer and the client options.
//! Commands are signed Interests named `<prefix>/<module>/<verb>/<params>`;
//! datasets are segmented streams under `<prefix>/<module>/<dataset>`.

use bytes::Bytes;
use log::{debug, info};
use ndn_mgmt_common::{
    ndn::{Interest, KeyLocator, Name, NameComponent},
    Error,
};
use ndn_mgmt_transport::{ClientOptions, CommandSigner, StreamFace, Transport};
use std::sync::Arc;

use crate::{
    dataset::decode_all,
    error::{ManagementError, Result},
    fetch::{fetch, get_data, RetryPolicy},
    types::{
        ChannelStatus, ControlParameters, ControlResponse, FaceStatus, FibEntry, ForwarderStatus,
        LocalControlFeature, RibEntry, RouteFlags, RouteOrigin, StrategyChoice, TlvRecord,
    },
};

/// Command verbs and dataset names, relative to the command prefix.
pub mod verbs {
    pub const FACES_CREATE: &str = "faces/create";
    pub const FACES_DESTROY: &str = "faces/destroy";
    pub const FACES_ENABLE_LOCAL_CONTROL: &str = "faces/enable-local-control";
    pub const FACES_DISABLE_LOCAL_CONTROL: &str = "faces/disable-local-control";
    pub const RIB_REGISTER: &str = "rib/register";
    pub const RIB_UNREGISTER: &str = "rib/unregister";
    pub const STRATEGY_SET: &str = "strategy-choice/set";
    pub const STRATEGY_UNSET: &str = "strategy-choice/unset";

    pub const STATUS_GENERAL: &str = "status/general";
    pub const FACES_LIST: &str = "faces/list";
    pub const FACES_CHANNELS: &str = "faces/channels";
    pub const FIB_LIST: &str = "fib/list";
    pub const RIB_LIST: &str = "rib/list";
    pub const STRATEGY_LIST: &str = "strategy-choice/list";
}

/// Management client for one forwarder.
pub struct Nfdc<T> {
    face: T,
    signer: Option<Arc<dyn CommandSigner>>,
    prefix: Name,
    policy: RetryPolicy,
}

impl Nfdc<StreamFace> {
    /// Connect to the forwarder named by `options.face_uri`.
    pub async fn connect(options: ClientOptions) -> Result<Self> {
        let uri = options.face_uri()?;
        let face = StreamFace::connect(&uri).await?;
        info!("Connected to forwarder at {}", uri);
        Self::new(face, options)
    }
}

impl<T: Transport> Nfdc<T> {
    pub fn new(face: T, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        let prefix = Name::from_string(&options.command_prefix)
            .map_err(|e| ManagementError::Config(format!("Invalid command prefix: {}", e)))?;

        Ok(Self {
            face,
            signer: None,
            prefix,
            policy: RetryPolicy::from(&options),
        })
    }

    /// Sign control commands with `signer`. Datasets need no signer.
    pub fn with_signer(mut self, signer: Arc<dyn CommandSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn face(&self) -> &T {
        &self.face
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn name_for(&self, verb: &str) -> Name {
        verb.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.prefix.clone(), |name, part| {
                name.append(NameComponent::new(Bytes::copy_from_slice(part.as_bytes())))
            })
    }

    /// Send a signed control command and return the successful response.
    ///
    /// A non-200 status becomes [`ManagementError::Rejected`] carrying the
    /// forwarder's code and text.
    pub async fn dispatch(&self, verb: &str, parameters: &ControlParameters) -> Result<ControlResponse> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ManagementError::Config(format!("No command signer configured for {}", verb))
        })?;

        let name = self
            .name_for(verb)
            .append(NameComponent::new(parameters.wire_encode()));
        let interest = Interest::new(name)
            .with_must_be_fresh(false)
            .with_lifetime(self.policy.interest_lifetime_ms);
        let interest = signer.sign(interest).map_err(|e| match e {
            Error::Signing(msg) => ManagementError::Config(msg),
            other => other.into(),
        })?;

        debug!("Dispatching {} command", verb);
        let data = get_data(&self.face, interest, &self.policy).await?;
        let response = ControlResponse::wire_decode(&data.content)?;

        if !response.is_success() {
            info!(
                "{} rejected with {}: {}",
                verb, response.status_code, response.status_text
            );
            return Err(ManagementError::Rejected {
                status_code: response.status_code,
                status_text: response.status_text,
            });
        }
        debug!("{} succeeded", verb);
        Ok(response)
    }

    /// Fetch and decode a multi-record status dataset.
    pub async fn dataset<R: TlvRecord>(&self, verb: &str) -> Result<Vec<R>> {
        let payload = fetch(&self.face, &self.name_for(verb), &self.policy).await?;
        Ok(decode_all(&payload)?)
    }

    pub async fn get_forwarder_status(&self) -> Result<ForwarderStatus> {
        let payload = fetch(&self.face, &self.name_for(verbs::STATUS_GENERAL), &self.policy).await?;
        Ok(ForwarderStatus::wire_decode(&payload)?)
    }

    pub async fn get_face_list(&self) -> Result<Vec<FaceStatus>> {
        self.dataset(verbs::FACES_LIST).await
    }

    pub async fn get_channel_list(&self) -> Result<Vec<ChannelStatus>> {
        self.dataset(verbs::FACES_CHANNELS).await
    }

    pub async fn get_fib_list(&self) -> Result<Vec<FibEntry>> {
        self.dataset(verbs::FIB_LIST).await
    }

    pub async fn get_route_list(&self) -> Result<Vec<RibEntry>> {
        self.dataset(verbs::RIB_LIST).await
    }

    pub async fn get_strategy_list(&self) -> Result<Vec<StrategyChoice>> {
        self.dataset(verbs::STRATEGY_LIST).await
    }

    /// Name of the key that signs the forwarder's status dataset.
    pub async fn get_key_locator(&self) -> Result<Name> {
        let interest = Interest::new(self.name_for(verbs::STATUS_GENERAL))
            .with_can_be_prefix(true)
            .with_must_be_fresh(true)
            .with_lifetime(self.policy.interest_lifetime_ms);
        let data = get_data(&self.face, interest, &self.policy).await?;

        match data.signature_info.key_locator {
            Some(KeyLocator::Name(name)) => Ok(name),
            _ => Err(ManagementError::Malformed(format!(
                "{} carries no KeyLocator name",
                data.name
            ))),
        }
    }

    /// Create a face to `uri` and return its id.
    pub async fn create_face(&self, uri: &str) -> Result<u64> {
        let parameters = ControlParameters::new().with_uri(uri);
        let response = self.dispatch(verbs::FACES_CREATE, &parameters).await?;

        let face_id = response
            .body
            .first()
            .and_then(|body| body.face_id)
            .ok_or_else(|| {
                ManagementError::Malformed(format!("faces/create response for {} has no FaceId", uri))
            })?;
        info!("Created face {} to {}", face_id, uri);
        Ok(face_id)
    }

    pub async fn destroy_face(&self, face_id: u64) -> Result<()> {
        let parameters = ControlParameters::new().with_face_id(face_id);
        self.dispatch(verbs::FACES_DESTROY, &parameters).await?;
        info!("Destroyed face {}", face_id);
        Ok(())
    }

    /// Enable a local control header feature on the requesting face.
    pub async fn enable_local_control(&self, feature: LocalControlFeature) -> Result<()> {
        let parameters = ControlParameters::new().with_local_control_feature(feature);
        self.dispatch(verbs::FACES_ENABLE_LOCAL_CONTROL, &parameters).await?;
        Ok(())
    }

    pub async fn disable_local_control(&self, feature: LocalControlFeature) -> Result<()> {
        let parameters = ControlParameters::new().with_local_control_feature(feature);
        self.dispatch(verbs::FACES_DISABLE_LOCAL_CONTROL, &parameters).await?;
        Ok(())
    }

    pub async fn register(&self, parameters: &ControlParameters) -> Result<ControlResponse> {
        self.dispatch(verbs::RIB_REGISTER, parameters).await
    }

    /// Register `route` on the requesting face as an application route.
    pub async fn register_prefix(&self, route: &Name, cost: u64) -> Result<()> {
        let parameters = ControlParameters::new()
            .with_name(route.clone())
            .with_origin(RouteOrigin::App)
            .with_cost(cost)
            .with_flags(RouteFlags::CHILD_INHERIT);
        self.register(&parameters).await?;
        info!("Registered {} on the requesting face", route);
        Ok(())
    }

    /// Register a static route for `route` on `face_id`.
    pub async fn register_on_face(&self, face_id: u64, route: &Name, cost: u64) -> Result<()> {
        let parameters = ControlParameters::new()
            .with_name(route.clone())
            .with_face_id(face_id)
            .with_origin(RouteOrigin::Static)
            .with_cost(cost)
            .with_flags(RouteFlags::CHILD_INHERIT);
        self.register(&parameters).await?;
        info!("Registered {} on face {}", route, face_id);
        Ok(())
    }

    /// Create a face to `uri`, then route `route` through it.
    ///
    /// Not atomic: if registration fails the new face is left in place.
    pub async fn register_with_uri(&self, uri: &str, route: &Name, cost: u64) -> Result<u64> {
        let face_id = self.create_face(uri).await?;
        self.register_on_face(face_id, route, cost).await?;
        Ok(face_id)
    }

    pub async fn unregister(&self, parameters: &ControlParameters) -> Result<ControlResponse> {
        self.dispatch(verbs::RIB_UNREGISTER, parameters).await
    }

    /// Remove `route` from the requesting face.
    pub async fn unregister_prefix(&self, route: &Name) -> Result<()> {
        let parameters = ControlParameters::new().with_name(route.clone());
        self.unregister(&parameters).await?;
        info!("Unregistered {} from the requesting face", route);
        Ok(())
    }

    pub async fn unregister_on_face(&self, route: &Name, face_id: u64) -> Result<()> {
        let parameters = ControlParameters::new()
            .with_name(route.clone())
            .with_face_id(face_id);
        self.unregister(&parameters).await?;
        info!("Unregistered {} from face {}", route, face_id);
        Ok(())
    }

    /// Remove `route` from the face whose remote URI is `uri`.
    pub async fn unregister_with_uri(&self, route: &Name, uri: &str) -> Result<()> {
        let face_id = self
            .get_face_list()
            .await?
            .into_iter()
            .find(|face| face.remote_uri == uri)
            .map(|face| face.face_id)
            .ok_or_else(|| ManagementError::FaceNotFound(uri.to_string()))?;
        self.unregister_on_face(route, face_id).await
    }

    /// Use `strategy` for `prefix` and everything beneath it.
    pub async fn set_strategy(&self, prefix: &Name, strategy: &Name) -> Result<()> {
        let parameters = ControlParameters::new()
            .with_name(prefix.clone())
            .with_strategy(strategy.clone());
        self.dispatch(verbs::STRATEGY_SET, &parameters).await?;
        info!("Set strategy for {} to {}", prefix, strategy);
        Ok(())
    }

    pub async fn unset_strategy(&self, prefix: &Name) -> Result<()> {
        let parameters = ControlParameters::new().with_name(prefix.clone());
        self.dispatch(verbs::STRATEGY_UNSET, &parameters).await?;
        info!("Unset strategy for {}", prefix);
        Ok(())
    }
}
