//! Asset type definitions and the static type registry.
//!
//! Every catalogued asset shares one record shape ([`crate::Asset`]). What
//! differs between types is captured here as data: the attributes a type
//! declares, the relationships it can hold, and the capability tags it carries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A capability tag attached to an asset type.
///
/// Capabilities replace a deep interface hierarchy: callers ask
/// "does this type carry SQL semantics?" rather than matching on concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Data asset that can participate in lineage as an input or output.
    Catalog,
    /// Relational database object.
    Sql,
    /// Business-intelligence object (dashboards, reports).
    Bi,
    /// Pipeline / orchestration object.
    Orchestration,
    /// Lineage process linking inputs to outputs.
    Lineage,
    /// Business glossary object.
    Glossary,
    /// Data-quality monitor.
    Monitor,
    /// Object-store object (buckets, objects).
    ObjectStore,
    /// Connection to a source system.
    Connection,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Capability; 9] = [
        Capability::Catalog,
        Capability::Sql,
        Capability::Bi,
        Capability::Orchestration,
        Capability::Lineage,
        Capability::Glossary,
        Capability::Monitor,
        Capability::ObjectStore,
        Capability::Connection,
    ];

    /// Returns the snake_case name of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Catalog => "catalog",
            Capability::Sql => "sql",
            Capability::Bi => "bi",
            Capability::Orchestration => "orchestration",
            Capability::Lineage => "lineage",
            Capability::Glossary => "glossary",
            Capability::Monitor => "monitor",
            Capability::ObjectStore => "object_store",
            Capability::Connection => "connection",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// Kind of value an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Long,
    Boolean,
    Double,
    /// String restricted to the listed values.
    Enum(&'static [&'static str]),
    /// Epoch milliseconds.
    Date,
    StringList,
    Map,
}

impl AttributeKind {
    /// Returns true if `value` is acceptable for this kind.
    ///
    /// `null` is always accepted: it clears the attribute.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            AttributeKind::String => value.is_string(),
            AttributeKind::Long | AttributeKind::Date => value.is_i64() || value.is_u64(),
            AttributeKind::Boolean => value.is_boolean(),
            AttributeKind::Double => value.is_number(),
            AttributeKind::Enum(allowed) => value
                .as_str()
                .map(|s| allowed.contains(&s))
                .unwrap_or(false),
            AttributeKind::StringList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            AttributeKind::Map => value.is_object(),
        }
    }
}

/// Declaration of a single attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDef {
    pub name: &'static str,
    pub kind: AttributeKind,
}

const fn attr(name: &'static str, kind: AttributeKind) -> AttributeDef {
    AttributeDef { name, kind }
}

/// What a relationship may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipTarget {
    /// Exactly this type name.
    Type(&'static str),
    /// Any type carrying this capability.
    Capability(Capability),
}

/// Declaration of a relationship attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipDef {
    pub name: &'static str,
    pub target: RelationshipTarget,
    /// Whether the relationship holds a set (true) or a single reference.
    pub many: bool,
}

const fn one(name: &'static str, target: RelationshipTarget) -> RelationshipDef {
    RelationshipDef {
        name,
        target,
        many: false,
    }
}

const fn many(name: &'static str, target: RelationshipTarget) -> RelationshipDef {
    RelationshipDef {
        name,
        target,
        many: true,
    }
}

impl RelationshipDef {
    /// Returns true if an asset of `type_name` may be referenced by this relationship.
    pub fn accepts(&self, type_name: &str) -> bool {
        match self.target {
            RelationshipTarget::Type(expected) => expected == type_name,
            RelationshipTarget::Capability(cap) => {
                find(type_name).map(|t| t.has(cap)).unwrap_or(false)
            }
        }
    }
}

/// Allowed certificate status values.
pub const CERTIFICATE_STATUSES: &[&str] = &["VERIFIED", "DRAFT", "DEPRECATED"];

/// Allowed announcement type values.
pub const ANNOUNCEMENT_TYPES: &[&str] = &["information", "warning", "issue"];

/// Attributes every asset type inherits.
pub const COMMON_ATTRIBUTES: &[AttributeDef] = &[
    attr("qualifiedName", AttributeKind::String),
    attr("name", AttributeKind::String),
    attr("displayName", AttributeKind::String),
    attr("description", AttributeKind::String),
    attr("userDescription", AttributeKind::String),
    attr("ownerUsers", AttributeKind::StringList),
    attr("ownerGroups", AttributeKind::StringList),
    attr(
        "certificateStatus",
        AttributeKind::Enum(CERTIFICATE_STATUSES),
    ),
    attr("certificateStatusMessage", AttributeKind::String),
    attr("certificateUpdatedBy", AttributeKind::String),
    attr("certificateUpdatedAt", AttributeKind::Date),
    attr("announcementType", AttributeKind::Enum(ANNOUNCEMENT_TYPES)),
    attr("announcementTitle", AttributeKind::String),
    attr("announcementMessage", AttributeKind::String),
    attr("connectionQualifiedName", AttributeKind::String),
    attr("connectorName", AttributeKind::String),
];

/// Relationships every asset type inherits.
pub const COMMON_RELATIONSHIPS: &[RelationshipDef] = &[many(
    "meanings",
    RelationshipTarget::Type("AtlasGlossaryTerm"),
)];

/// Definition of one asset type.
#[derive(Debug, PartialEq, Eq)]
pub struct AssetType {
    /// Wire type name, e.g. `Table`.
    pub name: &'static str,
    pub capabilities: &'static [Capability],
    /// Type-specific attributes (common attributes are implied).
    pub attributes: &'static [AttributeDef],
    /// Type-specific relationships (common relationships are implied).
    pub relationships: &'static [RelationshipDef],
}

impl AssetType {
    /// Returns true if this type carries the capability.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Looks up an attribute declared by this type or inherited by all types.
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeDef> {
        COMMON_ATTRIBUTES
            .iter()
            .chain(self.attributes.iter())
            .find(|a| a.name == name)
    }

    /// Looks up a type-specific attribute (excluding inherited ones).
    pub fn own_attribute(&self, name: &str) -> Option<&'static AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Looks up a relationship declared by this type or inherited by all types.
    pub fn relationship(&self, name: &str) -> Option<&'static RelationshipDef> {
        COMMON_RELATIONSHIPS
            .iter()
            .chain(self.relationships.iter())
            .find(|r| r.name == name)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

use AttributeKind::{Boolean, Date, Double, Long, StringList};
use RelationshipTarget::Type;

const STR: AttributeKind = AttributeKind::String;
const CATALOG: RelationshipTarget = RelationshipTarget::Capability(Capability::Catalog);

pub static CONNECTION: AssetType = AssetType {
    name: "Connection",
    capabilities: &[Capability::Connection],
    attributes: &[
        attr(
            "category",
            AttributeKind::Enum(&[
                "warehouse",
                "database",
                "bi",
                "objectstore",
                "lake",
                "orchestration",
                "monitoring",
                "custom",
            ]),
        ),
        attr("host", STR),
        attr("port", Long),
        attr("allowQuery", Boolean),
        attr("allowQueryPreview", Boolean),
        attr("adminUsers", StringList),
        attr("adminGroups", StringList),
    ],
    relationships: &[],
};

pub static DATABASE: AssetType = AssetType {
    name: "Database",
    capabilities: &[Capability::Catalog, Capability::Sql],
    attributes: &[attr("schemaCount", Long)],
    relationships: &[many("schemas", Type("Schema"))],
};

pub static SCHEMA: AssetType = AssetType {
    name: "Schema",
    capabilities: &[Capability::Catalog, Capability::Sql],
    attributes: &[
        attr("tableCount", Long),
        attr("viewsCount", Long),
        attr("databaseName", STR),
        attr("databaseQualifiedName", STR),
    ],
    relationships: &[
        one("database", Type("Database")),
        many("tables", Type("Table")),
        many("views", Type("View")),
    ],
};

pub static TABLE: AssetType = AssetType {
    name: "Table",
    capabilities: &[Capability::Catalog, Capability::Sql],
    attributes: &[
        attr("columnCount", Long),
        attr("rowCount", Long),
        attr("sizeBytes", Long),
        attr("isPartitioned", Boolean),
        attr("isTemporary", Boolean),
        attr("schemaName", STR),
        attr("schemaQualifiedName", STR),
        attr("databaseName", STR),
        attr("databaseQualifiedName", STR),
    ],
    relationships: &[
        one("atlanSchema", Type("Schema")),
        many("columns", Type("Column")),
        many("inputToProcesses", Type("Process")),
        many("outputFromProcesses", Type("Process")),
    ],
};

pub static VIEW: AssetType = AssetType {
    name: "View",
    capabilities: &[Capability::Catalog, Capability::Sql],
    attributes: &[
        attr("columnCount", Long),
        attr("definition", STR),
        attr("schemaName", STR),
        attr("schemaQualifiedName", STR),
    ],
    relationships: &[
        one("atlanSchema", Type("Schema")),
        many("columns", Type("Column")),
        many("inputToProcesses", Type("Process")),
        many("outputFromProcesses", Type("Process")),
    ],
};

pub static COLUMN: AssetType = AssetType {
    name: "Column",
    capabilities: &[Capability::Catalog, Capability::Sql],
    attributes: &[
        attr("dataType", STR),
        attr("order", Long),
        attr("isNullable", Boolean),
        attr("isPrimary", Boolean),
        attr("isForeign", Boolean),
        attr("maxLength", Long),
        attr("precision", Long),
        attr("numericScale", Double),
        attr("tableName", STR),
        attr("tableQualifiedName", STR),
        attr("viewName", STR),
        attr("viewQualifiedName", STR),
    ],
    relationships: &[one("table", Type("Table")), one("view", Type("View"))],
};

pub static PROCESS: AssetType = AssetType {
    name: "Process",
    capabilities: &[Capability::Lineage],
    attributes: &[attr("code", STR), attr("sql", STR), attr("ast", STR)],
    relationships: &[
        many("inputs", CATALOG),
        many("outputs", CATALOG),
        one("airflowTasks", Type("AirflowTask")),
    ],
};

pub static GLOSSARY: AssetType = AssetType {
    name: "AtlasGlossary",
    capabilities: &[Capability::Glossary],
    attributes: &[
        attr("shortDescription", STR),
        attr("longDescription", STR),
        attr("language", STR),
        attr("usage", STR),
    ],
    relationships: &[many("terms", Type("AtlasGlossaryTerm"))],
};

pub static GLOSSARY_TERM: AssetType = AssetType {
    name: "AtlasGlossaryTerm",
    capabilities: &[Capability::Glossary],
    attributes: &[
        attr("shortDescription", STR),
        attr("longDescription", STR),
        attr("examples", StringList),
        attr("abbreviation", STR),
        attr("usage", STR),
    ],
    relationships: &[
        one("anchor", Type("AtlasGlossary")),
        many("assignedEntities", CATALOG),
    ],
};

pub static TABLEAU_DASHBOARD: AssetType = AssetType {
    name: "TableauDashboard",
    capabilities: &[Capability::Catalog, Capability::Bi],
    attributes: &[
        attr("siteQualifiedName", STR),
        attr("projectQualifiedName", STR),
        attr("topLevelProjectQualifiedName", STR),
        attr("workbookQualifiedName", STR),
        attr("projectHierarchy", AttributeKind::Map),
    ],
    relationships: &[
        many("inputToProcesses", Type("Process")),
        many("outputFromProcesses", Type("Process")),
    ],
};

pub static AIRFLOW_DAG: AssetType = AssetType {
    name: "AirflowDag",
    capabilities: &[Capability::Catalog, Capability::Orchestration],
    attributes: &[
        attr("airflowDagSchedule", STR),
        attr("airflowDagScheduleDeltaInSec", Long),
        attr("airflowRunVersion", STR),
        attr("airflowTags", StringList),
    ],
    relationships: &[many("airflowTasks", Type("AirflowTask"))],
};

pub static AIRFLOW_TASK: AssetType = AssetType {
    name: "AirflowTask",
    capabilities: &[Capability::Catalog, Capability::Orchestration],
    attributes: &[
        attr("airflowTaskOperatorClass", STR),
        attr("airflowDagName", STR),
        attr("airflowDagQualifiedName", STR),
        attr("airflowTaskConnectionId", STR),
        attr("airflowTaskSql", STR),
        attr("airflowTaskRetryNumber", Long),
        attr("airflowTaskPool", STR),
        attr("airflowTaskPoolSlots", Long),
        attr("airflowTaskQueue", STR),
        attr("airflowTaskPriorityWeight", Long),
        attr("airflowTaskTriggerRule", STR),
    ],
    relationships: &[
        one("airflowDag", Type("AirflowDag")),
        many("inputs", CATALOG),
        many("outputs", CATALOG),
        one("process", Type("Process")),
    ],
};

pub static MC_MONITOR: AssetType = AssetType {
    name: "MCMonitor",
    capabilities: &[Capability::Catalog, Capability::Monitor],
    attributes: &[
        attr("mcMonitorId", STR),
        attr("mcMonitorStatus", STR),
        attr("mcMonitorType", STR),
        attr("mcMonitorWarehouse", STR),
        attr("mcMonitorScheduleType", STR),
        attr("mcMonitorNamespace", STR),
        attr("mcMonitorRuleType", STR),
        attr("mcMonitorRuleScheduleConfigHumanized", STR),
        attr("mcMonitorAlertCondition", STR),
        attr("mcMonitorRuleNextExecutionTime", Date),
        attr("mcMonitorRulePreviousExecutionTime", Date),
        attr("mcMonitorIsOotb", Boolean),
        attr("mcMonitorBreachRate", Double),
        attr("mcMonitorIncidentCount", Long),
    ],
    relationships: &[many("mcMonitorAssets", CATALOG)],
};

pub static S3_BUCKET: AssetType = AssetType {
    name: "S3Bucket",
    capabilities: &[Capability::Catalog, Capability::ObjectStore],
    attributes: &[
        attr("s3ObjectCount", Long),
        attr("s3BucketVersioningEnabled", Boolean),
        attr("awsArn", STR),
        attr("awsRegion", STR),
        attr("awsAccountId", STR),
    ],
    relationships: &[many("objects", Type("S3Object"))],
};

pub static S3_OBJECT: AssetType = AssetType {
    name: "S3Object",
    capabilities: &[Capability::Catalog, Capability::ObjectStore],
    attributes: &[
        attr("s3ObjectKey", STR),
        attr("s3ObjectSize", Long),
        attr("s3ObjectContentType", STR),
        attr("s3ObjectLastModifiedTime", Date),
        attr("s3ObjectStorageClass", STR),
        attr("s3BucketName", STR),
        attr("s3BucketQualifiedName", STR),
        attr("awsArn", STR),
    ],
    relationships: &[one("bucket", Type("S3Bucket"))],
};

/// Every registered asset type.
pub static ALL_TYPES: [&AssetType; 15] = [
    &CONNECTION,
    &DATABASE,
    &SCHEMA,
    &TABLE,
    &VIEW,
    &COLUMN,
    &PROCESS,
    &GLOSSARY,
    &GLOSSARY_TERM,
    &TABLEAU_DASHBOARD,
    &AIRFLOW_DAG,
    &AIRFLOW_TASK,
    &MC_MONITOR,
    &S3_BUCKET,
    &S3_OBJECT,
];

/// Resolves a wire type name to its definition.
pub fn find(type_name: &str) -> Option<&'static AssetType> {
    ALL_TYPES.iter().copied().find(|t| t.name == type_name)
}

/// Returns every registered type carrying the capability.
pub fn types_with(capability: Capability) -> Vec<&'static AssetType> {
    ALL_TYPES
        .iter()
        .copied()
        .filter(|t| t.has(capability))
        .collect()
}
