//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Order status.
///
/// Any status may replace any other; the registry does not enforce
/// transitions. On the wire and in the database the values are the Spanish
/// names (`pendiente`, `procesando`, ...); the English names are accepted as
/// input aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "estado_pedido"))]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "pending")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "pendiente"))]
    Pending,
    #[serde(rename = "procesando", alias = "processing")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "procesando"))]
    Processing,
    #[serde(rename = "enviado", alias = "shipped")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "enviado"))]
    Shipped,
    #[serde(rename = "entregado", alias = "delivered")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "entregado"))]
    Delivered,
    #[serde(rename = "cancelado", alias = "cancelled")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "cancelado"))]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The wire/database name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Processing => "procesando",
            Self::Shipped => "enviado",
            Self::Delivered => "entregado",
            Self::Cancelled => "cancelado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => Ok(Self::Pending),
            "procesando" | "processing" => Ok(Self::Processing),
            "enviado" | "shipped" => Ok(Self::Shipped),
            "entregado" | "delivered" => Ok(Self::Delivered),
            "cancelado" | "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
