/*!

The session gateway to vCenter. [`VcenterSession::connect`] logs in through the vSphere JSON API
and the resulting session reads the inventory as an [`InventorySource`].

!*/

mod vim;

use crate::constants::HTTP_TIMEOUT_SECS;
use crate::credentials::VcenterCredentials;
use crate::error::{
    ConnectionSnafu, HttpClientSnafu, IncompleteVmSnafu, InvalidUrlSnafu, LoginRejectedSnafu,
    LogoutSnafu, MissingSessionIdSnafu, MissingSessionManagerSnafu, Result, ServiceRequestSnafu,
    VimDecodeSnafu, VimRequestSnafu, VimResponseSnafu,
};
use crate::source::{
    GuestNic, InventoryObject, InventorySource, ManagedObjectReference, VmDetails,
};
use async_trait::async_trait;
use log::{debug, info, trace, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use snafu::{OptionExt, ResultExt};
use std::collections::VecDeque;
use std::time::Duration;
use url::Url;
use vim::{GuestInfo, LoginRequest, ServiceContent, VirtualMachineSummary};

/// The response header that carries the session token, and the request header that presents it.
const SESSION_HEADER: &str = "vmware-api-session-id";

const DATACENTER: &str = "Datacenter";
const FOLDER: &str = "Folder";
const CLUSTER_COMPUTE_RESOURCE: &str = "ClusterComputeResource";
const COMPUTE_RESOURCE: &str = "ComputeResource";

/// Where to reach vCenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcenterEndpoint {
    pub host: String,
    pub port: u16,
    /// The vSphere JSON API release, e.g. `8.0.1.0`.
    pub release: String,
}

impl VcenterEndpoint {
    pub fn base_url(&self) -> Result<Url> {
        let url = format!(
            "https://{}:{}/sdk/vim25/{}/",
            self.host, self.port, self.release
        );
        Url::parse(&url).context(InvalidUrlSnafu { url })
    }
}

/// An authenticated vCenter session. Certificate validation is disabled for the session.
#[derive(Debug)]
pub struct VcenterSession {
    http: Client,
    base: Url,
    session_id: String,
    session_manager: ManagedObjectReference,
    root_folder: ManagedObjectReference,
}

impl VcenterSession {
    /// Opens a session. Any failure is reported as [`Error::Connection`](crate::Error::Connection).
    pub async fn connect(
        endpoint: &VcenterEndpoint,
        credentials: &VcenterCredentials,
    ) -> Result<Self> {
        let login = async { Self::login(endpoint.base_url()?, &endpoint.host, credentials).await };
        login.await.context(ConnectionSnafu {
            host: &endpoint.host,
        })
    }

    /// Reads the service content below `base`, then logs in with the session manager it names.
    async fn login(base: Url, host: &str, credentials: &VcenterCredentials) -> Result<Self> {
        warn!("Certificate validation is disabled for vCenter '{}'", host);
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context(HttpClientSnafu)?;

        let content_url = join(&base, "ServiceInstance/ServiceInstance/content")?;
        let response = http
            .get(content_url.clone())
            .send()
            .await
            .context(ServiceRequestSnafu {
                url: content_url.as_str(),
            })?;
        let content: ServiceContent = checked(response, content_url.path())
            .await?
            .json()
            .await
            .context(VimDecodeSnafu {
                path: content_url.path(),
            })?;
        if let Some(name) = content.about.as_ref().and_then(|about| about.full_name.as_ref()) {
            debug!("vCenter reports itself as '{}'", name);
        }
        let session_manager = content
            .session_manager
            .clone()
            .context(MissingSessionManagerSnafu)?;

        let login_url = join(
            &base,
            &format!("{}/{}/Login", session_manager.kind, session_manager.value),
        )?;
        let response = http
            .post(login_url.clone())
            .json(&LoginRequest {
                user_name: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await
            .context(ServiceRequestSnafu {
                url: login_url.as_str(),
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return LoginRejectedSnafu {
                user: &credentials.username,
                status: status.as_u16(),
                body,
            }
            .fail();
        }
        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .context(MissingSessionIdSnafu {
                header: SESSION_HEADER,
            })?;
        info!(
            "Logged in to vCenter '{}' as '{}'",
            host, credentials.username
        );

        Ok(Self {
            http,
            base,
            session_id,
            session_manager,
            root_folder: content.root_folder,
        })
    }

    /// Ends the session on the server.
    pub async fn logout(&self) -> Result<()> {
        let path = format!(
            "{}/{}/Logout",
            self.session_manager.kind, self.session_manager.value
        );
        let url = join(&self.base, &path)?;
        self.http
            .post(url)
            .header(SESSION_HEADER, &self.session_id)
            .send()
            .await
            .and_then(Response::error_for_status)
            .context(LogoutSnafu)?;
        debug!("Logged out of vCenter");
        Ok(())
    }

    /// Reads one property of a managed object: `GET /{type}/{moId}/{property}`.
    async fn property<T>(&self, object: &ManagedObjectReference, property: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}/{}/{}", object.kind, object.value, property);
        trace!("GET {}", path);
        let url = join(&self.base, &path)?;
        let response = self
            .http
            .get(url)
            .header(SESSION_HEADER, &self.session_id)
            .send()
            .await
            .context(VimRequestSnafu { path: &path })?;
        checked(response, &path)
            .await?
            .json()
            .await
            .context(VimDecodeSnafu { path })
    }

    /// Like [`Self::property`] for properties that vCenter may leave unset.
    async fn optional_property<T>(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.property::<Option<T>>(object, property).await
    }

    async fn named(&self, reference: ManagedObjectReference) -> Result<InventoryObject> {
        let name: String = self.property(&reference, "name").await?;
        Ok(InventoryObject { reference, name })
    }

    /// Collects the objects of the `wanted` types below `folder`, descending into nested folders.
    async fn children_of_type(
        &self,
        folder: &ManagedObjectReference,
        wanted: &[&str],
    ) -> Result<Vec<ManagedObjectReference>> {
        let mut found = Vec::new();
        let mut folders = VecDeque::from([folder.clone()]);
        while let Some(folder) = folders.pop_front() {
            let children: Vec<ManagedObjectReference> = self
                .optional_property(&folder, "childEntity")
                .await?
                .unwrap_or_default();
            for child in children {
                if wanted.contains(&child.kind.as_str()) {
                    found.push(child);
                } else if child.kind == FOLDER {
                    folders.push_back(child);
                }
            }
        }
        Ok(found)
    }

    async fn named_all(
        &self,
        references: Vec<ManagedObjectReference>,
    ) -> Result<Vec<InventoryObject>> {
        let mut objects = Vec::with_capacity(references.len());
        for reference in references {
            objects.push(self.named(reference).await?);
        }
        Ok(objects)
    }
}

#[async_trait]
impl InventorySource for VcenterSession {
    async fn datacenters(&self) -> Result<Vec<InventoryObject>> {
        let references = self
            .children_of_type(&self.root_folder, &[DATACENTER])
            .await?;
        self.named_all(references).await
    }

    async fn clusters(&self, datacenter: &InventoryObject) -> Result<Vec<InventoryObject>> {
        let host_folder: ManagedObjectReference =
            self.property(&datacenter.reference, "hostFolder").await?;
        let references = self
            .children_of_type(&host_folder, &[CLUSTER_COMPUTE_RESOURCE, COMPUTE_RESOURCE])
            .await?;
        self.named_all(references).await
    }

    async fn hosts(&self, cluster: &InventoryObject) -> Result<Vec<InventoryObject>> {
        let references: Vec<ManagedObjectReference> = self
            .optional_property(&cluster.reference, "host")
            .await?
            .unwrap_or_default();
        self.named_all(references).await
    }

    async fn virtual_machines(&self, host: &InventoryObject) -> Result<Vec<ManagedObjectReference>> {
        Ok(self
            .optional_property(&host.reference, "vm")
            .await?
            .unwrap_or_default())
    }

    async fn vm_details(&self, vm: &ManagedObjectReference) -> Result<VmDetails> {
        let summary: VirtualMachineSummary = self.property(vm, "summary").await?;
        let guest: GuestInfo = self
            .optional_property(vm, "guest")
            .await?
            .unwrap_or_default();
        let config = summary.config.unwrap_or_default();
        let name = config.name.context(IncompleteVmSnafu {
            vm: vm.to_string(),
            field: "name",
        })?;
        Ok(VmDetails {
            name,
            num_cpu: config.num_cpu.unwrap_or_default(),
            memory_mb: config.memory_size_mb.unwrap_or_default(),
            committed_bytes: summary
                .storage
                .and_then(|storage| storage.committed)
                .unwrap_or_default(),
            nics: guest
                .net
                .unwrap_or_default()
                .into_iter()
                .map(GuestNic::from)
                .collect(),
        })
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path).context(InvalidUrlSnafu {
        url: format!("{}{}", base, path),
    })
}

/// Turns a non-success response into [`Error::VimResponse`](crate::Error::VimResponse).
async fn checked(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    VimResponseSnafu {
        path,
        status: status.as_u16(),
        body,
    }
    .fail()
}
