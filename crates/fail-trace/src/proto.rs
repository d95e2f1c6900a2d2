//! Hand-written prost types for the trace event wire schema.
//!
//! Every scalar is `optional` so that presence is carried by the encoding
//! itself. The decoder enforces which fields are actually required.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TraceEvent {
    #[prost(uint64, optional, tag = "1")]
    pub ip: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub memaddr: ::core::option::Option<u64>,
    #[prost(uint32, optional, tag = "3")]
    pub width: ::core::option::Option<u32>,
    #[prost(enumeration = "AccessType", optional, tag = "4")]
    pub accesstype: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "5")]
    pub trace_ext: ::core::option::Option<Extended>,
    #[prost(uint64, optional, tag = "6")]
    pub time_delta: ::core::option::Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AccessType {
    Read = 1,
    Write = 2,
}

/// Producer-side context attached to an event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Extended {
    #[prost(uint64, optional, tag = "1")]
    pub data: ::core::option::Option<u64>,
    #[prost(message, repeated, tag = "2")]
    pub registers: ::prost::alloc::vec::Vec<extended::Register>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub stack: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

pub mod extended {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Register {
        #[prost(uint32, optional, tag = "1")]
        pub id: ::core::option::Option<u32>,
        #[prost(uint64, optional, tag = "2")]
        pub value: ::core::option::Option<u64>,
        #[prost(uint64, optional, tag = "3")]
        pub value_deref: ::core::option::Option<u64>,
    }
}
