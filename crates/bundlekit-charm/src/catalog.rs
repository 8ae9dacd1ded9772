//! Base OpenStack service catalogue used to generate a bundle from scratch.

/// Services of a minimal OpenStack cloud, in deployment-friendly order.
pub const BASE_CHARMS: &[&str] = &[
    "mysql",
    "rabbitmq-server",
    "keystone",
    "glance",
    "cinder",
    "nova-cloud-controller",
    "nova-compute",
    "neutron-api",
    "neutron-gateway",
    "neutron-openvswitch",
    "openstack-dashboard",
];

/// Relations between [`BASE_CHARMS`], as endpoint pairs.
pub const BASE_RELATIONS: &[[&str; 2]] = &[
    ["keystone", "mysql"],
    ["glance", "mysql"],
    ["glance", "keystone"],
    ["cinder", "mysql"],
    ["cinder", "keystone"],
    ["cinder", "rabbitmq-server"],
    ["cinder", "glance"],
    ["nova-cloud-controller", "mysql"],
    ["nova-cloud-controller", "keystone"],
    ["nova-cloud-controller", "rabbitmq-server"],
    ["nova-cloud-controller", "glance"],
    ["nova-cloud-controller", "neutron-api"],
    ["nova-compute", "nova-cloud-controller"],
    ["nova-compute", "rabbitmq-server"],
    ["nova-compute", "glance"],
    ["nova-compute:neutron-plugin", "neutron-openvswitch:neutron-plugin"],
    ["neutron-api", "mysql"],
    ["neutron-api", "keystone"],
    ["neutron-api", "rabbitmq-server"],
    ["neutron-api", "neutron-openvswitch"],
    ["neutron-gateway", "nova-cloud-controller"],
    ["neutron-gateway:amqp", "rabbitmq-server:amqp"],
    ["neutron-gateway", "neutron-api"],
    ["neutron-openvswitch", "rabbitmq-server"],
    ["openstack-dashboard", "keystone"],
];

/// Subordinate charms, deployed with zero units of their own.
pub const SUBORDINATE_CHARMS: &[&str] = &["neutron-openvswitch", "hacluster"];

/// Returns whether `name` is deployed as a subordinate.
#[must_use]
pub fn is_subordinate(name: &str) -> bool {
    SUBORDINATE_CHARMS.contains(&name)
}
