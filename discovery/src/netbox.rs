/*!

An [`InventoryStore`] backed by the NetBox REST API. Requests authenticate with
`Authorization: Token <token>`.

!*/

use crate::constants::HTTP_TIMEOUT_SECS;
use crate::error::{
    ClusterAmbiguousSnafu, DuplicateNameSnafu, HttpClientSnafu, InvalidConfigSnafu,
    InvalidUrlSnafu, Result,
    StoreDecodeSnafu, StoreRequestSnafu, StoreResponseSnafu,
};
use crate::store::{
    ClusterRecord, EntityId, InventoryStore, NewInterface, NewIpAddress, NewVirtualMachine,
};
use async_trait::async_trait;
use log::{debug, trace, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::time::Duration;
use url::Url;

const CLUSTERS: &str = "api/virtualization/clusters/";
const VIRTUAL_MACHINES: &str = "api/virtualization/virtual-machines/";
const INTERFACES: &str = "api/virtualization/interfaces/";
const IP_ADDRESSES: &str = "api/ipam/ip-addresses/";

const STATUS_ACTIVE: &str = "active";
const VM_INTERFACE_OBJECT_TYPE: &str = "virtualization.vminterface";

pub struct NetboxClient {
    http: Client,
    base: Url,
}

impl NetboxClient {
    /// `base_url` is the NetBox root, e.g. `https://netbox.example.com`. With `insecure`,
    /// untrusted certificates are accepted.
    pub fn new(base_url: &str, token: &str, insecure: bool) -> Result<Self> {
        let mut root = base_url.trim_end_matches('/').to_string();
        root.push('/');
        let base = Url::parse(&root).context(InvalidUrlSnafu { url: base_url })?;

        let mut headers = HeaderMap::new();
        let mut authorization =
            HeaderValue::from_str(&format!("Token {}", token)).map_err(|_| {
                InvalidConfigSnafu {
                    reason: "the NetBox token is not a valid header value",
                }
                .build()
            })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if insecure {
            warn!("Certificate validation is disabled for NetBox '{}'", base);
        }
        let http = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context(HttpClientSnafu)?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base.join(path).context(InvalidUrlSnafu {
            url: format!("{}{}", self.base, path),
        })
    }

    async fn create<T>(&self, path: &str, what: &str, body: &T) -> Result<Response>
    where
        T: Serialize + Sync,
    {
        trace!("POST {}", path);
        self.http
            .post(self.url(path)?)
            .json(body)
            .send()
            .await
            .context(StoreRequestSnafu { what })
    }

    async fn created_id(response: Response, what: &str) -> Result<EntityId> {
        let response = success(response, what).await?;
        let created: Created = response.json().await.context(StoreDecodeSnafu { what })?;
        debug!("Created {} {}", what, created.id);
        Ok(created.id)
    }
}

#[async_trait]
impl InventoryStore for NetboxClient {
    async fn find_cluster(&self, name: &str) -> Result<Option<ClusterRecord>> {
        let what = "cluster lookup";
        let mut url = self.url(CLUSTERS)?;
        url.query_pairs_mut().append_pair("name", name);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context(StoreRequestSnafu { what })?;
        let page: Page<Cluster> = success(response, what)
            .await?
            .json()
            .await
            .context(StoreDecodeSnafu { what })?;
        // `name` is already an exact filter; compare again in case the server matches loosely.
        let mut matches: Vec<Cluster> = page
            .results
            .into_iter()
            .filter(|cluster| cluster.name == name)
            .collect();
        ensure!(
            matches.len() <= 1,
            ClusterAmbiguousSnafu {
                name,
                count: matches.len()
            }
        );
        Ok(matches.pop().map(ClusterRecord::from))
    }

    async fn create_virtual_machine(&self, vm: &NewVirtualMachine) -> Result<EntityId> {
        let what = "virtual machine";
        let response = self
            .create(VIRTUAL_MACHINES, what, &VirtualMachineBody::from(vm))
            .await?;
        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            ensure!(
                !is_duplicate(&body),
                DuplicateNameSnafu { name: &vm.name }
            );
            return StoreResponseSnafu {
                what,
                status: StatusCode::BAD_REQUEST.as_u16(),
                body,
            }
            .fail();
        }
        Self::created_id(response, what).await
    }

    async fn create_interface(&self, interface: &NewInterface) -> Result<EntityId> {
        let what = "interface";
        let response = self
            .create(INTERFACES, what, &InterfaceBody::from(interface))
            .await?;
        Self::created_id(response, what).await
    }

    async fn create_ip_address(&self, address: &NewIpAddress) -> Result<EntityId> {
        let what = "IP address";
        let response = self
            .create(IP_ADDRESSES, what, &IpAddressBody::from(address))
            .await?;
        Self::created_id(response, what).await
    }
}

async fn success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    StoreResponseSnafu {
        what,
        status: status.as_u16(),
        body,
    }
    .fail()
}

/// NetBox rejects a VM whose name is taken within the cluster with a validation error such as
/// `{"__all__": ["Virtual machine with this Cluster, Tenant and Name already exists."]}`.
fn is_duplicate(body: &str) -> bool {
    body.to_ascii_lowercase().contains("already exists")
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Cluster {
    id: EntityId,
    name: String,
    #[serde(rename = "type")]
    cluster_type: Option<ClusterType>,
}

#[derive(Debug, Deserialize)]
struct ClusterType {
    name: String,
    slug: Option<String>,
}

impl From<Cluster> for ClusterRecord {
    fn from(cluster: Cluster) -> Self {
        let cluster_type = cluster
            .cluster_type
            .map(|kind| std::iter::once(kind.name).chain(kind.slug).collect())
            .unwrap_or_default();
        ClusterRecord {
            id: cluster.id,
            name: cluster.name,
            cluster_type,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: EntityId,
}

#[derive(Debug, Serialize)]
struct VirtualMachineBody<'a> {
    name: &'a str,
    cluster: EntityId,
    status: &'static str,
    vcpus: u32,
    memory: u64,
    disk: u64,
}

impl<'a> From<&'a NewVirtualMachine> for VirtualMachineBody<'a> {
    fn from(vm: &'a NewVirtualMachine) -> Self {
        Self {
            name: &vm.name,
            cluster: vm.cluster,
            status: STATUS_ACTIVE,
            vcpus: vm.vcpus,
            memory: vm.memory_mb,
            disk: vm.disk_gb,
        }
    }
}

#[derive(Debug, Serialize)]
struct InterfaceBody<'a> {
    virtual_machine: EntityId,
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mac_address: Option<&'a str>,
}

impl<'a> From<&'a NewInterface> for InterfaceBody<'a> {
    fn from(interface: &'a NewInterface) -> Self {
        Self {
            virtual_machine: interface.virtual_machine,
            name: &interface.name,
            description: &interface.description,
            mac_address: interface.mac_address.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct IpAddressBody<'a> {
    address: String,
    description: &'a str,
    status: &'static str,
    assigned_object_type: &'static str,
    assigned_object_id: EntityId,
}

impl<'a> From<&'a NewIpAddress> for IpAddressBody<'a> {
    fn from(address: &'a NewIpAddress) -> Self {
        Self {
            address: address.address.to_string(),
            description: &address.description,
            status: STATUS_ACTIVE,
            assigned_object_type: VM_INTERFACE_OBJECT_TYPE,
            assigned_object_id: address.interface,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_server::serve;
    use crate::walker::Ipv4Interface;
    use crate::Error;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::response::{IntoResponse, Response as HttpResponse};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const TOKEN: &str = "0123456789abcdef";

    fn authorized(headers: &HeaderMap) -> bool {
        let expected = format!("Token {}", TOKEN);
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
    }

    /// Matches names case-insensitively, so the client has to narrow the results itself.
    async fn clusters(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> HttpResponse {
        if !authorized(&headers) {
            return HttpStatus::FORBIDDEN.into_response();
        }
        let all = [
            json!({"id": 7, "name": "prod", "type": {"id": 1, "name": "VMware ESXi", "slug": "esxi"}}),
            json!({"id": 8, "name": "PROD", "type": {"id": 1, "name": "VMware ESXi", "slug": "esxi"}}),
        ];
        let wanted = query.get("name").map(|name| name.to_lowercase());
        let results: Vec<Value> = all
            .into_iter()
            .filter(|cluster| {
                Some(cluster["name"].as_str().unwrap_or_default().to_lowercase()) == wanted
            })
            .collect();
        Json(json!({"count": results.len(), "next": null, "previous": null, "results": results}))
            .into_response()
    }

    async fn create_vm(headers: HeaderMap, Json(body): Json<Value>) -> HttpResponse {
        if !authorized(&headers) {
            return HttpStatus::FORBIDDEN.into_response();
        }
        match body["name"].as_str() {
            Some("web-01") => (
                HttpStatus::BAD_REQUEST,
                Json(json!({"__all__": ["Virtual machine with this Cluster, Tenant and Name already exists."]})),
            )
                .into_response(),
            Some("") => (
                HttpStatus::BAD_REQUEST,
                Json(json!({"name": ["This field may not be blank."]})),
            )
                .into_response(),
            _ => (HttpStatus::CREATED, Json(json!({"id": 11, "name": body["name"]}))).into_response(),
        }
    }

    async fn create_interface(Json(body): Json<Value>) -> HttpResponse {
        if body["virtual_machine"] != 11 {
            return (HttpStatus::BAD_REQUEST, Json(json!({"virtual_machine": ["Invalid pk"]})))
                .into_response();
        }
        (HttpStatus::CREATED, Json(json!({"id": 12}))).into_response()
    }

    async fn netbox() -> NetboxClient {
        let app = Router::new()
            .route(&format!("/{}", CLUSTERS), get(clusters))
            .route(&format!("/{}", VIRTUAL_MACHINES), post(create_vm))
            .route(&format!("/{}", INTERFACES), post(create_interface));
        let addr = serve(app).await;
        NetboxClient::new(&format!("http://{}", addr), TOKEN, false).unwrap()
    }

    fn new_vm(name: &str) -> NewVirtualMachine {
        NewVirtualMachine {
            name: name.into(),
            cluster: EntityId(7),
            vcpus: 2,
            memory_mb: 4096,
            disk_gb: 40,
        }
    }

    #[tokio::test]
    async fn cluster_lookup_matches_the_exact_name() {
        let netbox = netbox().await;
        let prod = netbox.find_cluster("prod").await.unwrap().unwrap();
        assert_eq!(prod.id, EntityId(7));
        assert!(prod.has_type("ESXi"));
        let upper = netbox.find_cluster("PROD").await.unwrap().unwrap();
        assert_eq!(upper.id, EntityId(8));
        assert!(netbox.find_cluster("Prod").await.unwrap().is_none());
        assert!(netbox.find_cluster("lab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn taken_vm_name_is_a_duplicate() {
        let netbox = netbox().await;
        let err = netbox
            .create_virtual_machine(&new_vm("web-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name } if name == "web-01"));
    }

    #[tokio::test]
    async fn other_validation_errors_keep_the_response() {
        let netbox = netbox().await;
        match netbox.create_virtual_machine(&new_vm("")).await {
            Err(Error::StoreResponse { status, body, .. }) => {
                assert_eq!(status, 400);
                assert!(body.contains("may not be blank"));
            }
            other => panic!("expected a store response error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn created_ids_are_returned() {
        let netbox = netbox().await;
        let vm = netbox.create_virtual_machine(&new_vm("db-01")).await.unwrap();
        assert_eq!(vm, EntityId(11));
        let interface = netbox
            .create_interface(&NewInterface {
                virtual_machine: vm,
                name: "NIC1".into(),
                description: "VM Network".into(),
                mac_address: None,
            })
            .await
            .unwrap();
        assert_eq!(interface, EntityId(12));
    }

    #[tokio::test]
    async fn wrong_token_is_refused() {
        let app = Router::new().route(&format!("/{}", CLUSTERS), get(clusters));
        let addr = serve(app).await;
        let netbox = NetboxClient::new(&format!("http://{}", addr), "nope", false).unwrap();
        assert!(matches!(
            netbox.find_cluster("prod").await,
            Err(Error::StoreResponse { status: 403, .. })
        ));
    }

    #[test]
    fn duplicate_detection() {
        assert!(is_duplicate(
            r#"{"__all__":["Virtual machine with this Cluster, Tenant and Name already exists."]}"#
        ));
        assert!(is_duplicate(
            r#"{"name":["A virtual machine with this name Already Exists."]}"#
        ));
        assert!(!is_duplicate(r#"{"vcpus":["Ensure this value is greater than 0."]}"#));
    }

    #[test]
    fn cluster_page() {
        let page: Page<Cluster> = serde_json::from_value(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 7,
                "name": "prod",
                "type": {"id": 1, "name": "VMware ESXi", "slug": "esxi"},
                "status": {"value": "active", "label": "Active"}
            }]
        }))
        .unwrap();
        let record = page.results.into_iter().next().map(ClusterRecord::from).unwrap();
        assert_eq!(record.id, EntityId(7));
        assert!(record.has_type("ESXi"));
        assert!(record.has_type("vmware esxi"));
        assert!(!record.has_type("Hyper-V"));
    }

    #[test]
    fn request_bodies() {
        let vm = NewVirtualMachine {
            name: "web-01".into(),
            cluster: EntityId(7),
            vcpus: 2,
            memory_mb: 4096,
            disk_gb: 40,
        };
        assert_eq!(
            serde_json::to_value(VirtualMachineBody::from(&vm)).unwrap(),
            json!({"name": "web-01", "cluster": 7, "status": "active", "vcpus": 2, "memory": 4096, "disk": 40})
        );

        let interface = NewInterface {
            virtual_machine: EntityId(11),
            name: "NIC1".into(),
            description: "VM Network".into(),
            mac_address: Some("00:50:56:aa:bb:cc".into()),
        };
        assert_eq!(
            serde_json::to_value(InterfaceBody::from(&interface)).unwrap(),
            json!({"virtual_machine": 11, "name": "NIC1", "description": "VM Network", "mac_address": "00:50:56:aa:bb:cc"})
        );

        let address = NewIpAddress {
            address: Ipv4Interface {
                address: "10.0.0.5".parse().unwrap(),
                prefix_length: 24,
            },
            description: "web-01 - NIC1".into(),
            interface: EntityId(12),
        };
        assert_eq!(
            serde_json::to_value(IpAddressBody::from(&address)).unwrap(),
            json!({
                "address": "10.0.0.5/24",
                "description": "web-01 - NIC1",
                "status": "active",
                "assigned_object_type": "virtualization.vminterface",
                "assigned_object_id": 12
            })
        );
    }

    #[test]
    fn base_url_is_normalized() {
        let client = NetboxClient::new("https://netbox.example.com/netbox", "t", false).unwrap();
        assert_eq!(
            client.url(VIRTUAL_MACHINES).unwrap().as_str(),
            "https://netbox.example.com/netbox/api/virtualization/virtual-machines/"
        );
    }
}
