use oaslint::build::build;
use oaslint::model::Document;
use oaslint::parse::parse_value;
use oaslint::{Context, NodeId, Pointer};

/// Parse an OpenAPI 3 fixture into a context, panicking on failure.
pub fn open(yaml: &str) -> Context {
    Context::try_open_api(yaml).expect("fixture should parse")
}

/// Parse a Swagger 2 fixture into a context, panicking on failure.
pub fn swagger(yaml: &str) -> Context {
    Context::try_swagger(yaml).expect("fixture should parse")
}

/// Build an unresolved document from a YAML fixture.
pub fn unresolved(yaml: &str) -> Document {
    build(&parse_value(yaml).expect("fixture should parse"))
}

pub fn ptr(s: &str) -> Pointer {
    Pointer::parse(s).expect("valid pointer literal")
}

/// Node at `pointer` in the canonical document.
pub fn node_at(ctx: &Context, pointer: &str) -> NodeId {
    ctx.document()
        .resolve(&ptr(pointer))
        .unwrap_or_else(|| panic!("nothing at {}", pointer))
}

pub const PETSTORE: &str = r##"
openapi: 3.0.0
info:
  title: Pets
  version: "1.0"
  x-audience: external
servers:
  - url: https://api.example.com
  - url: api.example.com/v2
paths:
  /pets:
    parameters:
      - name: X-Flow-Id
        in: header
        schema:
          type: string
    get:
      operationId: listPets
      parameters:
        - $ref: "#/components/parameters/Limit"
      responses:
        "200":
          description: ok
          headers:
            X-Rate-Limit:
              schema:
                type: integer
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/PetList"
    post:
      operationId: createPet
      requestBody:
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/Pet"
      responses:
        "201":
          description: created
  /pets/{petId}:
    get:
      operationId: showPet
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: string
        - $ref: "#/components/parameters/Limit"
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id:
          type: integer
        name:
          type: string
        tags:
          type: array
          items:
            type: string
    PetList:
      type: object
      properties:
        items:
          type: array
          items:
            $ref: "#/components/schemas/Pet"
  parameters:
    Limit:
      name: limit
      in: query
      schema:
        type: integer
"##;
