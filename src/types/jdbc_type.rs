//! Column type tags.

literal_enum! {
    /// SQL column type tag, written in documents by its upper-case name.
    pub enum JdbcType {
        Array => "ARRAY",
        Bit => "BIT",
        TinyInt => "TINYINT",
        SmallInt => "SMALLINT",
        Integer => "INTEGER",
        BigInt => "BIGINT",
        Float => "FLOAT",
        Real => "REAL",
        Double => "DOUBLE",
        Numeric => "NUMERIC",
        Decimal => "DECIMAL",
        Char => "CHAR",
        Varchar => "VARCHAR",
        LongVarchar => "LONGVARCHAR",
        Date => "DATE",
        Time => "TIME",
        Timestamp => "TIMESTAMP",
        Binary => "BINARY",
        VarBinary => "VARBINARY",
        LongVarBinary => "LONGVARBINARY",
        Null => "NULL",
        Other => "OTHER",
        Blob => "BLOB",
        Clob => "CLOB",
        Boolean => "BOOLEAN",
        Cursor => "CURSOR",
        Undefined => "UNDEFINED",
        NVarchar => "NVARCHAR",
        NChar => "NCHAR",
        NClob => "NCLOB",
        Struct => "STRUCT",
        JavaObject => "JAVA_OBJECT",
        Distinct => "DISTINCT",
        Ref => "REF",
        DataLink => "DATALINK",
        RowId => "ROWID",
        LongNVarchar => "LONGNVARCHAR",
        SqlXml => "SQLXML",
        DateTimeOffset => "DATETIMEOFFSET",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("VARCHAR".parse::<JdbcType>(), Ok(JdbcType::Varchar));
        assert!("varchar".parse::<JdbcType>().is_err());
    }

    #[test]
    fn test_error_lists_literals() {
        let err = "TEXT".parse::<JdbcType>().unwrap_err();
        assert!(err.contains("LONGVARCHAR"));
    }
}
