use sea_orm::entity::prelude::*;

/// The catalog category of an item. Stored as the lowercase display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
pub enum ItemCategory {
    #[sea_orm(string_value = "metal and steel work")]
    MetalAndSteelWork,
    #[sea_orm(string_value = "cement")]
    Cement,
    #[sea_orm(string_value = "ceramics")]
    Ceramics,
    #[sea_orm(string_value = "plastics")]
    Plastics,
    #[sea_orm(string_value = "wood and timber")]
    WoodAndTimber,
    #[sea_orm(string_value = "sand and stone")]
    SandAndStone,
    #[sea_orm(string_value = "bricks and masonry")]
    BricksAndMasonry,
    #[sea_orm(string_value = "fabricators")]
    Fabricators,
    #[sea_orm(string_value = "tools")]
    Tools,
    #[sea_orm(string_value = "glass")]
    Glass,
    #[sea_orm(string_value = "electrical systems")]
    ElectricalSystems,
    #[sea_orm(string_value = "paints")]
    Paints,
    #[sea_orm(string_value = "plumbing")]
    Plumbing,
    #[sea_orm(string_value = "security systems")]
    SecuritySystems,
    #[sea_orm(string_value = "doors and windows")]
    DoorsAndWindows,
    #[sea_orm(string_value = "telecommunications equipment")]
    TelecommunicationsEquipment,
    #[sea_orm(string_value = "building safety")]
    BuildingSafety,
    #[sea_orm(string_value = "furniture")]
    Furniture,
    #[sea_orm(string_value = "surface finishing")]
    SurfaceFinishing,
    #[sea_orm(string_value = "protection")]
    Protection,
    #[sea_orm(string_value = "roofing")]
    Roofing,
    #[sea_orm(string_value = "conveyor systems")]
    ConveyorSystems,
    #[sea_orm(string_value = "composites")]
    Composites,
    #[sea_orm(string_value = "flooring")]
    Flooring,
    #[sea_orm(string_value = "adhesives")]
    Adhesives,
    #[sea_orm(string_value = "others")]
    Others,
}

impl Default for ItemCategory {
    fn default() -> Self {
        Self::Others
    }
}

/// A catalog listing owned by exactly one seller. Image fields hold paths
/// into the media store; actual file handling lives outside this service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_name: String,
    pub item_description: Option<String>,
    /// The owning seller. Items are deleted with their seller.
    pub item_seller_id: i32,
    /// Unit price. Non-negative, validated at the API boundary.
    pub item_price: f64,
    pub item_measurement_unit: String,
    pub item_main_image: String,
    pub item_extra_image1: Option<String>,
    pub item_extra_image2: Option<String>,
    pub item_extra_image3: Option<String>,
    pub item_extra_image4: Option<String>,
    pub category: ItemCategory,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seller::Entity",
        from = "Column::ItemSellerId",
        to = "super::seller::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_item::Relation::Order.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::order_item::Relation::Item.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
