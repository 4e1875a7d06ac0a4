//! GraphQL query definitions for the platform storefront API.

use graphql_client::GraphQLQuery;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/tenant.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetTenantInfo;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/alternate_hrefs.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetAlternateHrefs;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/queries/settings.graphql",
    response_derives = "Debug, Clone"
)]
pub struct IsSalesChannelUpdate;
