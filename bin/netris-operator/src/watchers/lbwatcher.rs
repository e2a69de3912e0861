//! Keeps one L4LB per port of every `LoadBalancer` Service and reflects the
//! addresses Netris assigns back into the Service status.

use super::{log_errors, run_periodic, Result, WatcherError};
use crate::controllers::Context;
use k8s_openapi::api::core::v1::{ObjectReference, Pod, Service};
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::ResourceExt;
use kube_runtime::events::{Event, EventType, Recorder, Reporter};
use netris_api::v1alpha1::{IpRole, L4LBCheck, L4LBFrontend, L4LBSpec, L4LB, STATUS_FAILURE};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const NAME: &str = "lbwatcher";

/// Health check timeout of generated L4LBs, in milliseconds
const LB_TIMEOUT: u32 = 2000;

/// Generated L4LBs belong to the default tenant and site
const DEFAULT_TENANT_ID: i64 = 1;
const DEFAULT_SITE_ID: i64 = 1;

/// Failure message last published per L4LB, so an unchanged failure is
/// only reported once
type Reported = Arc<Mutex<HashMap<String, String>>>;

pub async fn run(ctx: Arc<Context>) {
    info!("Starting {}", NAME);
    let reported = Reported::default();
    run_periodic(NAME, ctx, move |ctx| process(ctx, reported.clone())).await
}

/// True when every selector label matches; an empty selector selects nothing
fn selects(selector: &BTreeMap<String, String>, pod: &Pod) -> bool {
    let labels = pod.labels();
    !selector.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

/// Build the desired L4LBs for every `LoadBalancer` Service. Services
/// without running pods produce nothing.
pub fn generate_load_balancers(
    services: &[Service],
    pods: &[Pod],
    tenant: &str,
    site: &str,
) -> Vec<L4LB> {
    let mut lbs = Vec::new();

    for svc in services {
        let Some(spec) = svc.spec.as_ref() else {
            continue;
        };
        if spec.type_.as_deref() != Some("LoadBalancer") {
            continue;
        }

        let namespace = svc.namespace().unwrap_or_default();
        let selector = spec.selector.clone().unwrap_or_default();
        let hosts: BTreeSet<&str> = pods
            .iter()
            .filter(|pod| pod.namespace().as_deref() == Some(namespace.as_str()))
            .filter(|pod| selects(&selector, pod))
            .filter_map(|pod| pod.status.as_ref()?.host_ip.as_deref())
            .filter(|ip| !ip.is_empty())
            .collect();
        if hosts.is_empty() {
            continue;
        }

        let ingress_ips: Vec<&str> = svc
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .map(|ingress| ingress.iter().filter_map(|i| i.ip.as_deref()).collect())
            .unwrap_or_default();
        let frontend_ip = spec.load_balancer_ip.clone().unwrap_or_default();
        let uid = svc.uid().unwrap_or_default();

        for port in spec.ports.iter().flatten() {
            let (Ok(frontend_port), Some(node_port)) = (u16::try_from(port.port), port.node_port) else {
                continue;
            };
            let protocol = port.protocol.as_deref().unwrap_or("TCP");

            let mut backend: Vec<String> = hosts.iter().map(|ip| format!("{}:{}", ip, node_port)).collect();
            backend.sort();

            let name = format!(
                "{}-{}-{}-{}-{}",
                svc.name_any(),
                namespace,
                uid,
                protocol,
                frontend_port
            )
            .to_lowercase();

            let mut lb = L4LB::new(
                &name,
                L4LBSpec {
                    owner_tenant: tenant.to_string(),
                    site: site.to_string(),
                    state: "active".to_string(),
                    protocol: protocol.to_lowercase(),
                    frontend: L4LBFrontend {
                        port: frontend_port,
                        ip: frontend_ip.clone(),
                    },
                    backend,
                    check: L4LBCheck {
                        kind: "tcp".to_string(),
                        timeout: LB_TIMEOUT,
                        request_path: String::new(),
                    },
                },
            );
            lb.metadata.namespace = Some(namespace.clone());
            lb.set_service(&svc.name_any(), &namespace, &uid);
            lb.set_service_ingress_ips(&ingress_ips.join(","));
            lbs.push(lb);
        }
    }

    lbs
}

/// Netris-assigned address of the `main` L4LB of each service, empty while
/// the main LB is still provisioning
pub fn main_ips(existing: &[L4LB]) -> HashMap<String, String> {
    existing
        .iter()
        .filter(|lb| lb.ip_role() == Some(IpRole::Main))
        .map(|lb| (lb.service_uid().to_string(), lb.status_ip().to_string()))
        .collect()
}

/// Work needed to bring the existing L4LBs in line with the generated ones
#[derive(Debug, Default)]
pub struct LbChanges {
    pub create: Vec<L4LB>,
    pub update: Vec<L4LB>,
    pub delete: Vec<L4LB>,
    /// Service uid to the ingress addresses its status should carry
    pub ingress: BTreeMap<String, BTreeSet<String>>,
}

pub fn compare_load_balancers(
    existing: &[L4LB],
    generated: &[L4LB],
    main_ips: &HashMap<String, String>,
) -> LbChanges {
    let mut changes = LbChanges::default();
    let by_name: HashMap<String, &L4LB> = existing.iter().map(|lb| (lb.name_any(), lb)).collect();
    let generated_names: HashSet<String> = generated.iter().map(|lb| lb.name_any()).collect();

    // Frontend address already used by a sibling LB of the same service
    let sibling_ips: HashMap<&str, &str> = existing
        .iter()
        .filter(|lb| generated_names.contains(&lb.name_any()))
        .filter(|lb| !lb.spec.frontend.ip.is_empty())
        .map(|lb| (lb.service_uid(), lb.spec.frontend.ip.as_str()))
        .collect();

    let mut wanted_ingress: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut current_ingress: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for gen in generated {
        let uid = gen.service_uid().to_string();
        wanted_ingress.entry(uid.clone()).or_default().extend(
            gen.service_ingress_ips()
                .split(',')
                .filter(|ip| !ip.is_empty())
                .map(String::from),
        );

        let Some(current) = by_name.get(&gen.name_any()) else {
            let mut lb = gen.clone();
            if lb.spec.frontend.ip.is_empty() {
                if let Some(ip) = sibling_ips.get(uid.as_str()) {
                    lb.spec.frontend.ip = ip.to_string();
                }
            }
            changes.create.push(lb);
            continue;
        };

        let mut lb = (*current).clone();
        lb.set_service(gen.service_name(), gen.service_namespace(), &uid);
        let status_ip = lb.status_ip().to_string();
        let ips = current_ingress.entry(uid.clone()).or_default();
        if !status_ip.is_empty() {
            ips.insert(status_ip);
        }

        let child = lb.ip_role() == Some(IpRole::Child);
        let mut update = false;

        if (!gen.spec.frontend.ip.is_empty() || !child) && gen.spec.frontend.ip != lb.spec.frontend.ip {
            lb.spec.frontend.ip = gen.spec.frontend.ip.clone();
            update = true;
        }

        if child && !update {
            if let Some(ip) = main_ips.get(&uid).filter(|ip| !ip.is_empty()) {
                if *ip != lb.spec.frontend.ip {
                    lb.spec.frontend.ip = ip.clone();
                    update = true;
                }
            }
        }

        if gen.spec.check.timeout != lb.spec.check.timeout {
            lb.spec.check.timeout = gen.spec.check.timeout;
            update = true;
        }

        let backends: BTreeSet<&String> = gen.spec.backend.iter().collect();
        if backends != lb.spec.backend.iter().collect::<BTreeSet<_>>() {
            lb.spec.backend = gen.spec.backend.clone();
            update = true;
        }

        if update {
            changes.update.push(lb);
        }
    }

    changes.delete = existing
        .iter()
        .filter(|lb| !generated_names.contains(&lb.name_any()))
        .cloned()
        .collect();

    for (uid, wanted) in wanted_ingress {
        let current = current_ingress.remove(&uid).unwrap_or_default();
        if wanted != current {
            changes.ingress.insert(uid, current);
        }
    }

    changes
}

/// Assign IP roles to the L4LBs of one service, in order. The first LB
/// without an address becomes `main`; while Netris has not assigned that
/// address nothing after it is written. Later LBs reuse it as `child`.
pub fn assign_roles(lbs: Vec<L4LB>, main_ip: Option<&str>) -> Vec<L4LB> {
    let mut out = Vec::new();

    for mut lb in lbs {
        let ip = lb.spec.frontend.ip.clone();
        let is_main = lb.ip_role() == Some(IpRole::Main);

        match main_ip {
            Some(main) if !is_main && (ip.is_empty() || ip == main) => {
                if main.is_empty() {
                    break;
                }
                lb.spec.frontend.ip = main.to_string();
                lb.set_ip_role(IpRole::Child);
                out.push(lb);
            }
            _ => {
                let automatic = ip.is_empty();
                lb.set_ip_role(if automatic { IpRole::Main } else { IpRole::Standard });
                out.push(lb);
                if automatic && main_ip.map_or(true, str::is_empty) {
                    break;
                }
            }
        }
    }

    out
}

fn group_by_uid(lbs: Vec<L4LB>) -> BTreeMap<String, Vec<L4LB>> {
    let mut groups: BTreeMap<String, Vec<L4LB>> = BTreeMap::new();
    for lb in lbs {
        groups.entry(lb.service_uid().to_string()).or_default().push(lb);
    }
    groups
}

fn l4lb_api(ctx: &Context, lb: &L4LB) -> Api<L4LB> {
    Api::namespaced(ctx.client.clone(), &lb.namespace().unwrap_or_default())
}

/// Merge patch setting the ingress addresses of a Service
fn ingress_patch(ips: &BTreeSet<String>) -> Value {
    let ingress: Vec<_> = ips.iter().map(|ip| json!({ "ip": ip })).collect();
    json!({ "status": { "loadBalancer": { "ingress": ingress } } })
}

/// The Service an L4LB was generated for
fn service_reference(lb: &L4LB) -> ObjectReference {
    ObjectReference {
        api_version: Some("v1".to_string()),
        kind: Some("Service".to_string()),
        name: Some(lb.service_name().to_string()),
        namespace: Some(lb.service_namespace().to_string()),
        uid: Some(lb.service_uid().to_string()),
        ..Default::default()
    }
}

fn failure_event(message: &str) -> Event {
    Event {
        type_: EventType::Warning,
        reason: STATUS_FAILURE.to_string(),
        note: Some(message.to_string()),
        action: "Provisioning".to_string(),
        secondary: None,
    }
}

/// Failed L4LBs whose message has not been published yet. LBs that are no
/// longer failing are forgotten so a later failure is reported again.
fn unreported_failures<'a>(
    lbs: &'a [L4LB],
    reported: &mut HashMap<String, String>,
) -> Vec<(&'a L4LB, String)> {
    let mut failing = HashSet::new();
    let mut fresh = Vec::new();

    for lb in lbs {
        let Some(status) = lb.status.as_ref() else {
            continue;
        };
        if status.status.as_deref() != Some(STATUS_FAILURE) {
            continue;
        }
        let name = lb.name_any();
        let message = status.message.clone().unwrap_or_default();
        failing.insert(name.clone());
        if reported.get(&name) != Some(&message) {
            reported.insert(name, message.clone());
            fresh.push((lb, message));
        }
    }

    reported.retain(|name, _| failing.contains(name));
    fresh
}

async fn process(ctx: Arc<Context>, reported: Reported) -> Result<()> {
    let snapshot = ctx.storage.snapshot().await;
    let tenant = snapshot
        .find_tenant_by_id(DEFAULT_TENANT_ID)
        .ok_or_else(|| WatcherError::Inventory("default tenant not found".to_string()))?;
    let site = snapshot
        .find_site_by_id(DEFAULT_SITE_ID)
        .ok_or_else(|| WatcherError::Inventory("default site not found".to_string()))?;

    let lp = ListParams::default();
    let services = Api::<Service>::all(ctx.client.clone()).list(&lp).await?.items;
    let pods = Api::<Pod>::all(ctx.client.clone()).list(&lp).await?.items;
    let generated = generate_load_balancers(&services, &pods, &tenant.name, &site.name);

    let l4lbs = Api::<L4LB>::all(ctx.client.clone()).list(&lp).await?.items;
    let existing: Vec<L4LB> = l4lbs.iter().filter(|lb| lb.is_service_owned()).cloned().collect();
    let main_ips = main_ips(&existing);

    let changes = compare_load_balancers(&existing, &generated, &main_ips);
    debug!(
        create = changes.create.len(),
        update = changes.update.len(),
        delete = changes.delete.len(),
        ingress = changes.ingress.len(),
        "Load balancer changes"
    );

    let mut errors: Vec<WatcherError> = Vec::new();

    for lb in &changes.delete {
        match l4lb_api(&ctx, lb).delete(&lb.name_any(), &DeleteParams::default()).await {
            Ok(_) => info!("Deleted L4LB {}", lb.name_any()),
            Err(e) => errors.push(e.into()),
        }
    }

    for (uid, lbs) in group_by_uid(changes.update) {
        for lb in assign_roles(lbs, main_ips.get(&uid).map(String::as_str)) {
            match l4lb_api(&ctx, &lb).replace(&lb.name_any(), &PostParams::default(), &lb).await {
                Ok(_) => info!("Updated L4LB {}", lb.name_any()),
                Err(e) => errors.push(e.into()),
            }
        }
    }

    for (uid, lbs) in group_by_uid(changes.create) {
        for lb in assign_roles(lbs, main_ips.get(&uid).map(String::as_str)) {
            match l4lb_api(&ctx, &lb).create(&PostParams::default(), &lb).await {
                Ok(_) => info!("Created L4LB {}", lb.name_any()),
                Err(e) => errors.push(e.into()),
            }
        }
    }

    for (uid, ips) in &changes.ingress {
        let Some(lb) = generated.iter().find(|lb| lb.service_uid() == uid) else {
            continue;
        };
        let body = ingress_patch(ips);
        let services: Api<Service> = Api::namespaced(ctx.client.clone(), lb.service_namespace());
        match services
            .patch_status(lb.service_name(), &PatchParams::default(), &Patch::Merge(&body))
            .await
        {
            Ok(_) => info!("Set ingress of service {}/{} to {:?}", lb.service_namespace(), lb.service_name(), ips),
            Err(e) => errors.push(e.into()),
        }
    }

    let failures = {
        let mut reported = reported.lock().unwrap_or_else(|e| e.into_inner());
        unreported_failures(&existing, &mut reported)
    };
    for (lb, message) in failures {
        let recorder = Recorder::new(ctx.client.clone(), Reporter::from(NAME), service_reference(lb));
        if let Err(e) = recorder.publish(failure_event(&message)).await {
            warn!("Failed to publish event for L4LB {}: {}", lb.name_any(), e);
            reported.lock().unwrap_or_else(|e| e.into_inner()).remove(&lb.name_any());
            errors.push(e.into());
        }
    }

    log_errors(NAME, &errors)
}
