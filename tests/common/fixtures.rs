//! Test fixtures - ARM templates and parameter files shared by CLI tests.

/// Key vault with a secret child; requires a `name` parameter
pub const VAULT_TEMPLATE: &str = r#"{
  "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#",
  "contentVersion": "1.0.0.0",
  "parameters": {
    "name": { "type": "string" },
    "enableDefaultTelemetry": { "type": "bool", "defaultValue": true }
  },
  "resources": [
    {
      "type": "Microsoft.KeyVault/vaults",
      "name": "[parameters('name')]",
      "resources": [
        { "type": "secrets", "name": "admin" }
      ]
    }
  ],
  "outputs": {
    "vaultName": { "type": "string", "value": "[parameters('name')]" },
    "secretCount": { "type": "int", "value": 1 }
  }
}
"#;

/// Parameter file with a `namePrefix` placeholder
pub const VAULT_PARAMETERS: &str = r#"{
  "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#",
  "contentVersion": "1.0.0.0",
  "parameters": {
    "name": { "value": "<<namePrefix>>-kv" }
  }
}
"#;

/// Parameter file using built-in scope tokens
pub const SCOPE_TOKEN_PARAMETERS: &str = r#"{
  "parameters": {
    "name": { "value": "<<resourceGroupName>>-<<subscriptionId>>" }
  }
}
"#;

/// Parameter file with one resolvable and one unknown placeholder
pub const PARTIAL_PARAMETERS: &str = r#"{
  "parameters": {
    "name": { "value": "<<namePrefix>>-<<unknownToken>>" }
  }
}
"#;

/// A network whose endpoint depends on something the template lacks
pub const FAILING_TEMPLATE: &str = r#"{
  "parameters": {
    "name": { "type": "string" }
  },
  "resources": [
    { "type": "Microsoft.Network/virtualNetworks", "name": "[parameters('name')]" },
    {
      "type": "Microsoft.Network/privateEndpoints",
      "name": "pe",
      "dependsOn": ["missingResource"]
    }
  ]
}
"#;

/// Settings defining the `namePrefix` local token
pub const SETTINGS_YAML: &str = r#"parameterFileTokens:
  tokenPrefix: '<<'
  tokenSuffix: '>>'
  localTokens:
    - name: namePrefix
      value: carml
"#;

/// Settings with custom delimiters
pub const SETTINGS_CUSTOM_DELIMITERS: &str = r#"parameterFileTokens:
  tokenPrefix: '#_'
  tokenSuffix: '_#'
  localTokens:
    - name: namePrefix
      value: carml
"#;
